// src/paths.rs
//! Centralized path derivation for pantry directories
//!
//! Everything lives under one root:
//!
//! ```text
//! <root>/
//!   recipes/            recipe files (<name>.toml)
//!   cache/downloads/    verified source artifacts, keyed by checksum
//!   cellar/<name>/<version>/
//!   bin/                symlinks to installed executables
//!   pantry.db           installed registry
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the root directory
pub const ROOT_ENV: &str = "PANTRY_ROOT";

/// Environment variable overriding the recipes directory
pub const RECIPES_ENV: &str = "PANTRY_RECIPES";

/// Root directory: `$PANTRY_ROOT`, else the user data dir, else `/opt/pantry`
pub fn default_root() -> PathBuf {
    std::env::var_os(ROOT_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::data_local_dir().map(|d| d.join("pantry")))
        .unwrap_or_else(|| PathBuf::from("/opt/pantry"))
}

/// Recipes directory: `$PANTRY_RECIPES`, else `<root>/recipes`
pub fn recipes_dir(root: &Path) -> PathBuf {
    std::env::var_os(RECIPES_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join("recipes"))
}

/// Download cache
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join("cache").join("downloads")
}

/// Directory holding one prefix per installed recipe
pub fn cellar_dir(root: &Path) -> PathBuf {
    root.join("cellar")
}

/// Install prefix for one recipe version
pub fn prefix_dir(root: &Path, name: &str, version: &str) -> PathBuf {
    cellar_dir(root).join(name).join(version)
}

/// Shared directory of executable symlinks
pub fn bin_dir(root: &Path) -> PathBuf {
    root.join("bin")
}

/// Registry database
pub fn db_path(root: &Path) -> PathBuf {
    root.join("pantry.db")
}
