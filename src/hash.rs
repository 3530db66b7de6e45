// src/hash.rs

//! Artifact checksums
//!
//! Recipes declare a single SHA-256 digest for their source artifact. The
//! algorithm is carried explicitly on [`Checksum`] so recipe files can use
//! either the bare `sha256 = "<hex>"` form or the prefixed `sha256:<hex>` form.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Read buffer for streaming file hashes (8 KB)
const HASH_BUFFER_SIZE: usize = 8192;

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Digest length in bytes
    #[inline]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
        }
    }

    /// Digest length as a hex string
    #[inline]
    pub const fn hex_len(&self) -> usize {
        self.output_len() * 2
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(HashError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("empty digest")]
    Empty,
    #[error("invalid hex in digest: {0}")]
    InvalidHex(String),
}

/// A declared or computed digest together with its algorithm
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum {
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest
    pub digest: String,
}

impl Checksum {
    /// Parse `sha256:<hex>` or a bare hex digest (SHA-256 assumed)
    ///
    /// Length is not checked here: a short digest is a valid declaration
    /// that simply never matches a real artifact.
    pub fn parse(s: &str) -> Result<Self, HashError> {
        let (algorithm, digest) = match s.split_once(':') {
            Some((algo, digest)) => (algo.parse()?, digest),
            None => (HashAlgorithm::Sha256, s),
        };

        let digest = digest.trim();
        if digest.is_empty() {
            return Err(HashError::Empty);
        }
        if !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidHex(digest.to_string()));
        }

        Ok(Self {
            algorithm,
            digest: digest.to_lowercase(),
        })
    }

    /// Whether the digest has the full length for its algorithm
    pub fn is_full_length(&self) -> bool {
        self.digest.len() == self.algorithm.hex_len()
    }

    /// Format as `sha256:<hex>`
    pub fn to_prefixed_string(&self) -> String {
        format!("{}:{}", self.algorithm, self.digest)
    }

    /// File-name-safe key for the download cache
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.algorithm, self.digest)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

impl FromStr for Checksum {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Compute the checksum of a byte slice
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> Checksum {
    let digest = match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
    };
    Checksum { algorithm, digest }
}

/// Compute the checksum of everything read from `reader`
pub fn hash_reader<R: Read>(algorithm: HashAlgorithm, reader: &mut R) -> io::Result<Checksum> {
    let mut hasher = match algorithm {
        HashAlgorithm::Sha256 => Sha256::new(),
    };
    let mut buffer = [0u8; HASH_BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(Checksum {
        algorithm,
        digest: hex::encode(hasher.finalize()),
    })
}

/// Compute the checksum of a file, streaming its content
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> io::Result<Checksum> {
    let mut file = File::open(path)?;
    hash_reader(algorithm, &mut file)
}

/// SHA-256 of a byte slice as lowercase hex
#[inline]
pub fn sha256(data: &[u8]) -> String {
    hash_bytes(HashAlgorithm::Sha256, data).digest
}

/// Verify that a file matches the expected checksum
///
/// Returns the computed checksum on mismatch so callers can report it.
pub fn verify_file(path: &Path, expected: &Checksum) -> io::Result<Result<(), Checksum>> {
    let actual = hash_file(expected.algorithm, path)?;
    if actual.digest == expected.digest {
        Ok(Ok(()))
    } else {
        Ok(Err(actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(sha256(b"hello world"), HELLO_WORLD);
        assert_eq!(sha256(b"").len(), 64);
    }

    #[test]
    fn test_hash_reader_matches_bytes() {
        let data = vec![7u8; 3 * HASH_BUFFER_SIZE + 11];
        let mut cursor = std::io::Cursor::new(&data);

        let streamed = hash_reader(HashAlgorithm::Sha256, &mut cursor).unwrap();
        assert_eq!(streamed, hash_bytes(HashAlgorithm::Sha256, &data));
    }

    #[test]
    fn test_parse_prefixed_and_bare() {
        let prefixed = Checksum::parse(&format!("sha256:{}", HELLO_WORLD)).unwrap();
        let bare = Checksum::parse(HELLO_WORLD).unwrap();
        assert_eq!(prefixed, bare);
        assert!(bare.is_full_length());
        assert_eq!(bare.to_prefixed_string(), format!("sha256:{}", HELLO_WORLD));
    }

    #[test]
    fn test_parse_normalizes_case() {
        let upper = Checksum::parse(&HELLO_WORLD.to_uppercase()).unwrap();
        assert_eq!(upper.digest, HELLO_WORLD);
    }

    #[test]
    fn test_parse_short_digest_is_accepted() {
        let short = Checksum::parse("deadbeef").unwrap();
        assert!(!short.is_full_length());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Checksum::parse(""), Err(HashError::Empty));
        assert!(matches!(Checksum::parse("xyz"), Err(HashError::InvalidHex(_))));
        assert!(matches!(
            Checksum::parse("md5:abc"),
            Err(HashError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_verify_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let good = Checksum::parse(HELLO_WORLD).unwrap();
        assert!(verify_file(file.path(), &good).unwrap().is_ok());

        let bad = Checksum::parse("deadbeef").unwrap();
        let actual = verify_file(file.path(), &bad).unwrap().unwrap_err();
        assert_eq!(actual.digest, HELLO_WORLD);
    }

    #[test]
    fn test_cache_key_is_path_safe() {
        let checksum = Checksum::parse("sha256:abc123").unwrap();
        assert_eq!(checksum.cache_key(), "sha256_abc123");
    }
}
