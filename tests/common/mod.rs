// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use pantry::recipe::{Kitchen, KitchenConfig, Recipe};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// A throwaway pantry root with a Kitchen over it.
///
/// Keep the struct alive for the duration of the test to prevent cleanup.
pub struct TestPantry {
    pub root: TempDir,
    pub kitchen: Kitchen,
}

impl TestPantry {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build with a tweaked configuration (timeouts, dependency policy, ...)
    pub fn with_config(tweak: impl FnOnce(&mut KitchenConfig)) -> Self {
        let root = tempfile::tempdir().unwrap();
        let mut config = KitchenConfig::with_root(root.path());
        config.timeout = Duration::from_secs(30);
        tweak(&mut config);
        let kitchen = Kitchen::new(config).unwrap();
        Self { root, kitchen }
    }

    /// Directory for source artifacts, outside the pantry layout
    pub fn sources_dir(&self) -> PathBuf {
        let dir = self.root.path().join("sources");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write an artifact and return its file:// URL and SHA-256 digest
    pub fn artifact(&self, file_name: &str, contents: &[u8]) -> (String, String) {
        let path = self.sources_dir().join(file_name);
        fs::write(&path, contents).unwrap();
        (file_url(&path), pantry::hash::sha256(contents))
    }

    /// Load a recipe for `name` whose source is `contents`, plus extra TOML
    pub fn recipe(&self, name: &str, contents: &[u8], extra: &str) -> Recipe {
        let (url, digest) = self.artifact(&format!("{}-1.0.0.tgz", name), contents);
        self.kitchen
            .load(&recipe_toml(name, &url, &digest, extra))
            .unwrap()
    }

    /// Path under the root for marker files written by steps
    pub fn marker(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}

pub fn file_url(path: &Path) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}

/// Minimal recipe TOML; `extra` is appended verbatim
pub fn recipe_toml(name: &str, url: &str, sha256: &str, extra: &str) -> String {
    format!(
        "name = \"{name}\"\ndesc = \"Test tool\"\nurl = \"{url}\"\nsha256 = \"{sha256}\"\nlicense = \"MIT\"\n{extra}\n"
    )
}
