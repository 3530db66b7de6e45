// src/recipe/kitchen/config.rs

//! Configuration for the Kitchen

use crate::paths;
use crate::process::DEFAULT_TIMEOUT;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Root of the pantry layout (see [`crate::paths`])
    pub root: PathBuf,
    /// Directory for downloaded and verified sources
    pub source_cache: PathBuf,
    /// Timeout for each install or test step
    pub timeout: Duration,
    /// Shell used for string-form steps (`<shell> -c <step>`)
    pub shell: String,
    /// Accept a dependency that is not installed by pantry but is an
    /// executable on the host `PATH`
    pub allow_host_deps: bool,
    /// Skip the runtime dependency check entirely
    pub skip_deps: bool,
    /// Number of recipes processed concurrently by batch operations
    pub jobs: usize,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self::with_root(&paths::default_root())
    }
}

impl KitchenConfig {
    /// Configuration with every directory derived from `root`
    pub fn with_root(root: &Path) -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);

        Self {
            root: root.to_path_buf(),
            source_cache: paths::cache_dir(root),
            timeout: DEFAULT_TIMEOUT,
            shell: "/bin/sh".to_string(),
            allow_host_deps: false,
            skip_deps: false,
            jobs,
        }
    }

    pub fn bin_dir(&self) -> PathBuf {
        paths::bin_dir(&self.root)
    }

    pub fn cellar_dir(&self) -> PathBuf {
        paths::cellar_dir(&self.root)
    }

    pub fn db_path(&self) -> PathBuf {
        paths::db_path(&self.root)
    }
}
