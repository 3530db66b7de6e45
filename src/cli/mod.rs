// src/cli/mod.rs
//! CLI definitions for pantry
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.
//!
//! Primary commands:
//! - `install` - Fetch, verify and install recipe(s), optionally testing them
//! - `test` - Run the acceptance test of an installed recipe
//!
//! Supporting commands:
//! - `fetch` - Download and verify a recipe's source only
//! - `audit` - Check a recipe for problems
//! - `list` - List installed (or available) recipes
//! - `uninstall` - Remove an installed recipe

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(author = "Pantry Contributors")]
#[command(version)]
#[command(about = "Fetch, verify, install and smoke-test command-line tools from recipes", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Root directory (default: $PANTRY_ROOT or the user data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory containing <name>.toml recipes (default: $PANTRY_RECIPES or <root>/recipes)
    #[arg(long, global = true, value_name = "DIR")]
    pub recipes: Option<PathBuf>,

    /// Timeout for each install or test step
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install one or more recipes
    Install {
        /// Recipe names
        #[arg(required = true)]
        names: Vec<String>,

        /// Run each recipe's test after installing it
        #[arg(long)]
        test: bool,

        /// Number of recipes to install concurrently
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Accept dependencies found as executables on the host PATH
        #[arg(long)]
        allow_host_deps: bool,

        /// Do not check runtime dependencies
        #[arg(long, conflicts_with = "allow_host_deps")]
        skip_deps: bool,

        /// Shell used for string-form install steps
        #[arg(long, default_value = "/bin/sh")]
        shell: String,
    },

    /// Run the acceptance test of an installed recipe
    Test {
        /// Recipe name
        name: String,

        /// Print the captured test output
        #[arg(long)]
        show_output: bool,
    },

    /// Download and verify a recipe's source artifact
    Fetch {
        /// Recipe name
        name: String,
    },

    /// Check a recipe for problems without installing it
    Audit {
        /// Recipe name (all recipes when omitted)
        name: Option<String>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// List installed recipes
    List {
        /// List recipes available in the recipes directory instead
        #[arg(long)]
        available: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove an installed recipe and its bin links
    Uninstall {
        /// Recipe name
        name: String,
    },
}
