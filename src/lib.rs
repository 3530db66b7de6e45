// src/lib.rs

//! Pantry: a recipe interpreter for command-line tools
//!
//! Pantry loads declarative recipes, downloads and verifies their source
//! artifacts, runs their install steps and smoke-tests the result.
//!
//! # Architecture
//!
//! - Checksum-first: nothing runs until the artifact matches its SHA-256
//! - Linear lifecycle per recipe: load, fetch, verify, install, test
//! - Installed state in SQLite, one prefix per recipe under the cellar
//! - Explicit process invocations with timeouts and a scrubbed environment

pub mod db;
mod error;
pub mod hash;
pub mod paths;
pub mod process;
pub mod recipe;

pub use error::{Error, Result, Stage};
pub use hash::{Checksum, HashAlgorithm};
pub use process::{HostRunner, Invocation, ProcessOutput, ProcessRunner};
pub use recipe::{Cook, CookResult, InstallContext, Kitchen, KitchenConfig, Recipe, TestResult};
