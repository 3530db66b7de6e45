// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are flat TOML files describing one tool: where its source comes
//! from, what it needs at runtime, how to install it and how to smoke-test it.

use crate::error::{Error, Result};
use crate::hash::Checksum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Version embedded in an archive name, e.g. `cdk8s-cli-1.0.96.tgz`
static VERSION_IN_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[-_]v?(\d+(?:\.\d+)*(?:[-.]?(?:alpha|beta|rc|pre)\.?\d*)?)(?:\.(?:tar\.gz|tgz|tar\.xz|txz|tar\.bz2|tbz2|tar\.zst|tar|zip|gem|crate))?$",
    )
    .expect("version pattern is valid")
});

/// Version reported when neither the recipe nor the URL provides one
pub const UNKNOWN_VERSION: &str = "latest";

/// A complete recipe for installing a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe identifier, also the lookup key (`<name>.toml`)
    pub name: String,

    /// Short human description
    #[serde(default)]
    pub desc: Option<String>,

    #[serde(default)]
    pub homepage: Option<String>,

    /// Source artifact URL (`https://`, `http://`, `file://` or a local path)
    pub url: String,

    /// Declared digest of the source artifact
    ///
    /// Either a bare SHA-256 hex digest or `sha256:<hex>`.
    pub sha256: String,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Explicit version; detected from the URL when absent
    #[serde(default)]
    pub version: Option<String>,

    /// Runtime dependencies, by recipe name
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Install steps, run in order inside the install prefix
    #[serde(default)]
    pub install: Vec<Step>,

    /// Glob patterns (relative to the prefix) symlinked into the shared bin
    /// directory once every install step has succeeded
    #[serde(default)]
    pub links: Vec<String>,

    /// Extra environment for install and test steps
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Acceptance test
    #[serde(default)]
    pub test: Option<TestSection>,
}

impl Recipe {
    /// Declared checksum of the source artifact
    pub fn checksum(&self) -> Result<Checksum> {
        Checksum::parse(&self.sha256).map_err(|e| {
            Error::MalformedRecipe(format!("{}: invalid sha256 '{}': {}", self.name, self.sha256, e))
        })
    }

    /// Version from the recipe, else from the archive name, else `latest`
    pub fn version(&self) -> String {
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            return version.to_string();
        }

        VERSION_IN_FILENAME
            .captures(&self.archive_filename())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    /// File name of the source artifact, from the last URL path segment
    pub fn archive_filename(&self) -> String {
        let path = match url::Url::parse(&self.url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => self.url.clone(),
        };

        path.rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or("source")
            .to_string()
    }

    /// Substitute `%(key)s` variables in a template
    ///
    /// Unknown variables are left untouched.
    pub fn substitute(&self, template: &str, vars: &BTreeMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("%({})s", key), value);
        }
        result
    }
}

/// One install or test command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Command line run through the configured shell (`/bin/sh -c`)
    Shell(String),
    /// Program and arguments, executed directly without a shell
    Exec(Vec<String>),
}

impl Step {
    /// Substitute recipe variables into every part of the step
    pub fn substituted(&self, recipe: &Recipe, vars: &BTreeMap<String, String>) -> Step {
        match self {
            Step::Shell(line) => Step::Shell(recipe.substitute(line, vars)),
            Step::Exec(argv) => Step::Exec(argv.iter().map(|a| recipe.substitute(a, vars)).collect()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Step::Shell(line) => line.trim().is_empty(),
            Step::Exec(argv) => argv.is_empty(),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Shell(line) => f.write_str(line),
            Step::Exec(argv) => f.write_str(&argv.join(" ")),
        }
    }
}

/// Acceptance test: one command plus expectations on its output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSection {
    pub command: Step,

    /// Substring(s) that must all appear in the combined output
    #[serde(default)]
    pub expect: Expect,

    /// Regular expression(s) that must all match the combined output
    #[serde(default)]
    pub pattern: Expect,

    /// Expected exit status; not checked when absent
    #[serde(default)]
    pub exit_code: Option<i32>,
}

impl TestSection {
    /// Assertions in declaration order: substrings first, then patterns
    pub fn assertions(&self) -> Vec<Assertion> {
        let mut assertions: Vec<Assertion> = self
            .expect
            .values()
            .iter()
            .map(|s| Assertion::Contains(s.clone()))
            .collect();
        assertions.extend(self.pattern.values().iter().map(|p| Assertion::Matches(p.clone())));
        assertions
    }
}

/// A single expected string or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Expect {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl Expect {
    pub fn values(&self) -> Vec<String> {
        match self {
            Expect::None => Vec::new(),
            Expect::One(s) => vec![s.clone()],
            Expect::Many(v) => v.clone(),
        }
    }
}

/// One check applied to test output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    Contains(String),
    Matches(String),
}

impl Assertion {
    /// Check the assertion against output
    ///
    /// An invalid regex never matches.
    pub fn check(&self, output: &str) -> bool {
        match self {
            Assertion::Contains(needle) => output.contains(needle.as_str()),
            Assertion::Matches(pattern) => Regex::new(pattern)
                .map(|re| re.is_match(output))
                .unwrap_or(false),
        }
    }
}

impl std::fmt::Display for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assertion::Contains(s) => write!(f, "output containing {:?}", s),
            Assertion::Matches(p) => write!(f, "output matching /{}/", p),
        }
    }
}
