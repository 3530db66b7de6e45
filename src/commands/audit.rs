// src/commands/audit.rs

//! Audit command - check recipes for problems

use super::{kitchen_config, recipes_dir};
use crate::cli::GlobalArgs;
use anyhow::{Result, bail};
use pantry::recipe::{list_recipes, load_named, validate_recipe};

/// Audit one recipe, or every recipe in the recipes directory
pub fn cmd_audit(global: &GlobalArgs, name: Option<&str>, strict: bool) -> Result<()> {
    let config = kitchen_config(global);
    let recipes_dir = recipes_dir(global, &config);

    let names = match name {
        Some(name) => vec![name.to_string()],
        None => list_recipes(&recipes_dir)?,
    };

    if names.is_empty() {
        println!("No recipes in {}", recipes_dir.display());
        return Ok(());
    }

    let mut errors = 0;
    let mut warnings = 0;

    for name in &names {
        let issues = match load_named(&recipes_dir, name).and_then(|r| validate_recipe(&r)) {
            Ok(issues) => issues,
            Err(e) => {
                errors += 1;
                println!("[ERROR] {}: {}", name, e);
                continue;
            }
        };

        if issues.is_empty() {
            println!("[OK] {}", name);
            continue;
        }

        warnings += issues.len();
        for issue in &issues {
            println!("Warning: {}: {}", name, issue);
        }
    }

    if errors > 0 {
        bail!("{} recipe(s) failed to load", errors);
    }
    if strict && warnings > 0 {
        bail!("{} warning(s) in strict mode", warnings);
    }
    Ok(())
}
