// src/recipe/kitchen/fetch.rs

//! Source fetchers
//!
//! A [`SourceFetcher`] copies the bytes behind a recipe URL to a local path.
//! Verification and caching are the Kitchen's job; fetchers only move bytes.

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Downloads a source URL to a destination path
pub trait SourceFetcher: Send + Sync {
    /// Write the resource at `url` to `dest`, returning the number of bytes
    ///
    /// Any failure to obtain the bytes is a [`Error::FetchError`].
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Where a recipe URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(String),
    Local(PathBuf),
}

impl SourceLocation {
    /// Classify a URL: `http(s)://` is remote, `file://` and bare paths are
    /// local, any other scheme is rejected
    pub fn parse(url: &str) -> Result<Self> {
        match Url::parse(url) {
            Ok(parsed) => match parsed.scheme() {
                "http" | "https" => Ok(SourceLocation::Remote(url.to_string())),
                "file" => parsed
                    .to_file_path()
                    .map(SourceLocation::Local)
                    .map_err(|_| fetch_error(url, "not a valid file URL")),
                other => Err(fetch_error(url, &format!("unsupported scheme '{}'", other))),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(SourceLocation::Local(PathBuf::from(url)))
            }
            Err(e) => Err(fetch_error(url, &e.to_string())),
        }
    }
}

fn fetch_error(url: &str, reason: &str) -> Error {
    Error::FetchError {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// HTTP(S) fetcher over a blocking reqwest client
///
/// Failed downloads are not retried.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a progress bar while downloading
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn client(&self, url: &str) -> Result<Client> {
        Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("pantry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| fetch_error(url, &format!("failed to create HTTP client: {}", e)))
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        info!("Downloading {} to {}", url, dest.display());

        let response = self
            .client(url)?
            .get(url)
            .send()
            .map_err(|e| fetch_error(url, &e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(url, &format!("HTTP {}", response.status())));
        }

        let total_size = response.content_length().unwrap_or(0);
        let progress = self.show_progress.then(|| create_progress_bar(total_size));

        let mut file = File::create(dest)
            .map_err(|e| Error::IoError(format!("Failed to create file {}: {e}", dest.display())))?;

        let downloaded = stream_to_file(url, response, &mut file, progress.as_ref());
        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }
        let downloaded = downloaded?;

        debug!("Downloaded {} bytes from {}", downloaded, url);
        Ok(downloaded)
    }
}

/// Stream a reader to a file in chunks, never buffering the whole body
fn stream_to_file<R: Read>(
    url: &str,
    mut reader: R,
    file: &mut File,
    progress_bar: Option<&ProgressBar>,
) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fetch_error(url, &format!("failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;

        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    Ok(downloaded)
}

fn create_progress_bar(size: u64) -> ProgressBar {
    if size == 0 {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})")
        {
            pb.set_style(style);
        }
        return pb;
    }

    let pb = ProgressBar::new(size);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Copies `file://` URLs and plain paths
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl SourceFetcher for LocalFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let source = match SourceLocation::parse(url)? {
            SourceLocation::Local(path) => path,
            SourceLocation::Remote(_) => {
                return Err(fetch_error(url, "not a local source"));
            }
        };

        if !source.is_file() {
            return Err(fetch_error(url, &format!("{} does not exist", source.display())));
        }

        debug!("Copying {} to {}", source.display(), dest.display());
        fs::copy(&source, dest).map_err(|e| fetch_error(url, &e.to_string()))
    }
}

/// Dispatches on the URL scheme: HTTP(S) remotely, everything else locally
#[derive(Debug, Clone, Default)]
pub struct UrlFetcher {
    http: HttpFetcher,
    local: LocalFetcher,
}

impl UrlFetcher {
    pub fn new(show_progress: bool) -> Self {
        Self {
            http: HttpFetcher::new().with_progress(show_progress),
            local: LocalFetcher,
        }
    }
}

impl SourceFetcher for UrlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        match SourceLocation::parse(url)? {
            SourceLocation::Remote(_) => self.http.fetch(url, dest),
            SourceLocation::Local(_) => self.local.fetch(url, dest),
        }
    }
}
