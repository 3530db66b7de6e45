// src/commands/list.rs

//! List command - show installed or available recipes

use super::{kitchen_config, recipes_dir};
use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use pantry::db::Registry;
use pantry::recipe::list_recipes;

pub fn cmd_list(global: &GlobalArgs, available: bool, json: bool) -> Result<()> {
    let config = kitchen_config(global);

    if available {
        let names = list_recipes(&recipes_dir(global, &config))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else {
            for name in names {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    let db_path = config.db_path();
    let registry = Registry::open(&db_path)
        .with_context(|| format!("Failed to open registry at {}", db_path.display()))?;
    let installed = registry.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&installed)?);
        return Ok(());
    }

    if installed.is_empty() {
        println!("No recipes installed");
        return Ok(());
    }

    for entry in &installed {
        println!("{} {} ({})", entry.name, entry.version, entry.prefix.display());
    }
    println!("\nTotal: {} recipe(s)", installed.len());
    Ok(())
}
