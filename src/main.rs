// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default_level = if cli.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Install {
            names,
            test,
            jobs,
            allow_host_deps,
            skip_deps,
            shell,
        } => {
            let opts = commands::InstallOptions {
                test,
                jobs,
                allow_host_deps,
                skip_deps,
                shell,
            };
            commands::cmd_install(&cli.global, &names, &opts)
        }
        Commands::Test { name, show_output } => commands::cmd_test(&cli.global, &name, show_output),
        Commands::Fetch { name } => commands::cmd_fetch(&cli.global, &name),
        Commands::Audit { name, strict } => commands::cmd_audit(&cli.global, name.as_deref(), strict),
        Commands::List { available, json } => commands::cmd_list(&cli.global, available, json),
        Commands::Uninstall { name } => commands::cmd_uninstall(&cli.global, &name),
    }
}
