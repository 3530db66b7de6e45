// src/commands/install.rs

//! Install command - fetch, verify, install and optionally test recipes

use super::{kitchen_config, open_kitchen, recipes_dir};
use crate::cli::GlobalArgs;
use anyhow::{Context, Result, bail};
use pantry::recipe::{CookResult, validate_recipe};
use tracing::info;

/// Flags of `pantry install`
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub test: bool,
    pub jobs: Option<usize>,
    pub allow_host_deps: bool,
    pub skip_deps: bool,
    pub shell: String,
}

/// Install recipes by name
///
/// A single recipe runs on the calling thread; several are installed on a
/// worker pool. Every recipe is attempted and failures are reported together.
pub fn cmd_install(global: &GlobalArgs, names: &[String], opts: &InstallOptions) -> Result<()> {
    let mut config = kitchen_config(global);
    config.allow_host_deps = opts.allow_host_deps;
    config.skip_deps = opts.skip_deps;
    config.shell = opts.shell.clone();
    if let Some(jobs) = opts.jobs {
        config.jobs = jobs.max(1);
    }

    let recipes_dir = recipes_dir(global, &config);
    let kitchen = open_kitchen(config)?;

    let mut recipes = Vec::with_capacity(names.len());
    for name in names {
        let recipe = kitchen
            .load_named(&recipes_dir, name)
            .with_context(|| format!("Failed to load recipe {}", name))?;

        for warning in validate_recipe(&recipe)? {
            println!("Warning: {}: {}", recipe.name, warning);
        }
        recipes.push(recipe);
    }

    if recipes.len() == 1 {
        let recipe = recipes.remove(0);
        let name = recipe.name.clone();
        let result = kitchen
            .cook(recipe, opts.test)
            .with_context(|| format!("Failed to install {}", name))?;
        print_result(&result);
        return Ok(());
    }

    println!(
        "Installing {} recipes with {} parallel jobs...",
        recipes.len(),
        kitchen.config().jobs
    );

    let results = kitchen.cook_batch(recipes, opts.test);
    let total = results.len();
    let mut failed = 0;

    for (name, result) in results {
        match result {
            Ok(result) => print_result(&result),
            Err(e) => {
                failed += 1;
                println!("[FAILED] {}: {}", name, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} recipes failed to install", failed, total);
    }

    info!("Installed {} recipes", total);
    Ok(())
}

fn print_result(result: &CookResult) {
    println!(
        "[COMPLETE] Installed {} {} into {}",
        result.name,
        result.version,
        result.prefix.display()
    );
    for link in &result.links {
        println!("  - {} -> {}", link.link_path.display(), link.target_path.display());
    }
    if let Some(test) = &result.test {
        println!("[OK] {} test passed", test.recipe);
    }
}
