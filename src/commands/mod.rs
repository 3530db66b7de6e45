// src/commands/mod.rs
//! Command handlers for the pantry CLI

mod audit;
mod fetch;
mod install;
mod list;
mod uninstall;

pub use audit::cmd_audit;
pub use fetch::cmd_fetch;
pub use install::{InstallOptions, cmd_install};
pub use list::cmd_list;
pub use test::cmd_test;
pub use uninstall::cmd_uninstall;

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use pantry::paths;
use pantry::recipe::{Kitchen, KitchenConfig, UrlFetcher};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Kitchen configuration from the global flags
pub fn kitchen_config(global: &GlobalArgs) -> KitchenConfig {
    let root = global.root.clone().unwrap_or_else(paths::default_root);
    let mut config = KitchenConfig::with_root(&root);
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config
}

/// Recipes directory from the global flags
pub fn recipes_dir(global: &GlobalArgs, config: &KitchenConfig) -> PathBuf {
    global
        .recipes
        .clone()
        .unwrap_or_else(|| paths::recipes_dir(&config.root))
}

/// Open a Kitchen, drawing download progress when stderr is a terminal
pub fn open_kitchen(config: KitchenConfig) -> Result<Kitchen> {
    let db_path = config.db_path();
    let kitchen = Kitchen::new(config)
        .with_context(|| format!("Failed to open registry at {}", db_path.display()))?;
    Ok(kitchen.with_fetcher(Arc::new(UrlFetcher::new(std::io::stderr().is_terminal()))))
}
