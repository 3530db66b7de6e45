// src/commands/uninstall.rs

//! Uninstall command - remove an installed recipe

use super::{kitchen_config, open_kitchen};
use crate::cli::GlobalArgs;
use anyhow::{Context, Result};

pub fn cmd_uninstall(global: &GlobalArgs, name: &str) -> Result<()> {
    let kitchen = open_kitchen(kitchen_config(global))?;

    let removed = kitchen
        .uninstall(name)
        .with_context(|| format!("Failed to uninstall {}", name))?;

    println!(
        "[COMPLETE] Removed {} {} ({} link(s))",
        removed.name,
        removed.version,
        removed.links.len()
    );
    Ok(())
}
