// src/commands/fetch.rs

//! Fetch command - download and verify a recipe's source

use super::{kitchen_config, open_kitchen, recipes_dir};
use crate::cli::GlobalArgs;
use anyhow::{Context, Result};

pub fn cmd_fetch(global: &GlobalArgs, name: &str) -> Result<()> {
    let config = kitchen_config(global);
    let recipes_dir = recipes_dir(global, &config);
    let kitchen = open_kitchen(config)?;

    let recipe = kitchen
        .load_named(&recipes_dir, name)
        .with_context(|| format!("Failed to load recipe {}", name))?;

    if kitchen.is_cached(&recipe) {
        println!("Source already cached");
    }

    let artifact = kitchen
        .fetch(&recipe)
        .with_context(|| format!("Failed to fetch sources for {}", name))?;

    println!("[COMPLETE] Fetched {}", artifact.display());
    println!("[OK] Verified {}", recipe.checksum()?.to_prefixed_string());
    Ok(())
}
