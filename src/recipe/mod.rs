// src/recipe/mod.rs

//! Recipe system for installing command-line tools
//!
//! A recipe declares one tool:
//! - Where its source artifact lives and its SHA-256 digest
//! - Runtime dependencies (other recipes)
//! - Install steps, run in order inside the install prefix
//! - Which installed files to expose on the shared `bin` directory
//! - An acceptance test
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The install specification (like a recipe card)
//! - **Kitchen**: The interpreter that fetches, installs and tests
//! - **Cook**: One recipe moving through its lifecycle
//! - **Cellar**: Where install prefixes live
//! - **Taste**: Running the acceptance test
//!
//! # Example Recipe
//!
//! ```toml
//! name = "cdk8s"
//! desc = "Define k8s native apps and abstractions using object-oriented programming"
//! homepage = "https://cdk8s.io/"
//! url = "https://registry.npmjs.org/cdk8s-cli/-/cdk8s-cli-1.0.96.tgz"
//! sha256 = "a86852dc0d7040cdf0baf37cf90ad623bdb84d8485c00c1216dc64ee8888d338"
//! license = "Apache-2.0"
//! depends_on = ["node"]
//! install = [
//!     ["npm", "install", "--global", "--prefix", "%(libexec)s", "%(artifact)s"],
//! ]
//! links = ["libexec/bin/*"]
//!
//! [test]
//! command = "touch testfile && %(bin)s/cdk8s init python-app"
//! expect = "Cannot initialize a project in a non-empty directory"
//! exit_code = 1
//! ```

mod format;
mod kitchen;
pub mod parser;

pub use format::{Assertion, Expect, Recipe, Step, TestSection, UNKNOWN_VERSION};
pub use kitchen::{
    deps, fetch, ChainResolver, Cook, CookResult, DependencyResolver, HostPathResolver,
    HttpFetcher, InstallContext, Kitchen, KitchenConfig, LocalFetcher, NoopResolver,
    RecipeState, RegistryResolver, SourceFetcher, TestResult, UrlFetcher,
};
pub use parser::{list_recipes, load_named, parse_recipe, parse_recipe_file, validate_recipe};
