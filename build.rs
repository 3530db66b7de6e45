// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe name
fn name_arg() -> Arg {
    Arg::new("name").required(true).help("Recipe name")
}

/// Mirror of the clap derive definitions in src/cli/mod.rs
fn build_cli() -> Command {
    Command::new("pantry")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Pantry Contributors")
        .about("Fetch, verify, install and smoke-test command-line tools from recipes")
        .subcommand_required(true)
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .global(true)
                .help("Root directory (default: $PANTRY_ROOT or the user data directory)"),
        )
        .arg(
            Arg::new("recipes")
                .long("recipes")
                .value_name("DIR")
                .global(true)
                .help("Directory containing <name>.toml recipes (default: $PANTRY_RECIPES or <root>/recipes)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .global(true)
                .help("Timeout for each install or test step"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("install")
                .about("Install one or more recipes")
                .arg(Arg::new("names").required(true).num_args(1..).help("Recipe names"))
                .arg(
                    Arg::new("test")
                        .long("test")
                        .action(ArgAction::SetTrue)
                        .help("Run each recipe's test after installing it"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of recipes to install concurrently"),
                )
                .arg(
                    Arg::new("allow_host_deps")
                        .long("allow-host-deps")
                        .action(ArgAction::SetTrue)
                        .help("Accept dependencies found as executables on the host PATH"),
                )
                .arg(
                    Arg::new("skip_deps")
                        .long("skip-deps")
                        .action(ArgAction::SetTrue)
                        .help("Do not check runtime dependencies"),
                )
                .arg(
                    Arg::new("shell")
                        .long("shell")
                        .default_value("/bin/sh")
                        .help("Shell used for string-form install steps"),
                ),
        )
        .subcommand(
            Command::new("test")
                .about("Run the acceptance test of an installed recipe")
                .arg(name_arg())
                .arg(
                    Arg::new("show_output")
                        .long("show-output")
                        .action(ArgAction::SetTrue)
                        .help("Print the captured test output"),
                ),
        )
        .subcommand(
            Command::new("fetch")
                .about("Download and verify a recipe's source artifact")
                .arg(name_arg()),
        )
        .subcommand(
            Command::new("audit")
                .about("Check a recipe for problems without installing it")
                .arg(Arg::new("name").help("Recipe name (all recipes when omitted)"))
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Treat warnings as errors"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List installed recipes")
                .arg(
                    Arg::new("available")
                        .long("available")
                        .action(ArgAction::SetTrue)
                        .help("List recipes available in the recipes directory instead"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output JSON"),
                ),
        )
        .subcommand(
            Command::new("uninstall")
                .about("Remove an installed recipe and its bin links")
                .arg(name_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("pantry.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
