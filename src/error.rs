// src/error.rs

//! Error types for pantry

use std::fmt;
use thiserror::Error;

/// Result type alias using pantry's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle stage a recipe was in when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    Fetch,
    Verify,
    Install,
    Test,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Fetch => "fetch",
            Stage::Verify => "verify",
            Stage::Install => "install",
            Stage::Test => "test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading, fetching, installing or testing recipes
#[derive(Error, Debug)]
pub enum Error {
    /// Recipe is missing required fields or is not valid TOML
    #[error("malformed recipe: {0}")]
    MalformedRecipe(String),

    /// Source artifact could not be downloaded
    #[error("failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    /// Downloaded artifact does not match the declared digest
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// An install step exited non-zero, failed to start, or timed out
    #[error("install step {index} failed ({})", describe_exit(.exit_code, .timed_out))]
    InstallStepFailed {
        index: usize,
        exit_code: Option<i32>,
        timed_out: bool,
    },

    /// Acceptance test did not produce the expected output
    #[error("test failed: expected {expected:?}, got {actual:?}")]
    TestFailed { expected: String, actual: String },

    /// A runtime dependency is not installed
    #[error("dependency not installed: {0}")]
    MissingDependency(String),

    /// A bin link is already owned by another installed recipe
    #[error("{link} is already linked by {owner}")]
    LinkConflict { link: String, owner: String },

    /// Recipe or installed entry does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Lifecycle transition that would move backwards or skip a stage
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// External process could not be started or waited on
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// Failure wrapped with the recipe and stage it happened in
    #[error("{recipe}: {stage} failed: {source}")]
    Stage {
        recipe: String,
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

fn describe_exit(exit_code: &Option<i32>, timed_out: &bool) -> String {
    match (exit_code, *timed_out) {
        (_, true) => "timed out".to_string(),
        (Some(code), false) => format!("exit code {}", code),
        (None, false) => "terminated by signal".to_string(),
    }
}

impl Error {
    /// Attach recipe name and stage to an error
    ///
    /// Errors that already carry a stage are returned unchanged.
    pub fn in_stage(self, recipe: &str, stage: Stage) -> Self {
        match self {
            staged @ Error::Stage { .. } => staged,
            other => Error::Stage {
                recipe: recipe.to_string(),
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The underlying failure kind, looking through stage wrappers
    pub fn kind(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.kind(),
            other => other,
        }
    }

    /// Stage the error was raised in, if known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Short name of the failure kind, e.g. `ChecksumMismatch`
    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            Error::MalformedRecipe(_) => "MalformedRecipe",
            Error::FetchError { .. } => "FetchError",
            Error::ChecksumMismatch { .. } => "ChecksumMismatch",
            Error::InstallStepFailed { .. } => "InstallStepFailed",
            Error::TestFailed { .. } => "TestFailed",
            Error::MissingDependency(_) => "MissingDependency",
            Error::LinkConflict { .. } => "LinkConflict",
            Error::NotFound(_) => "NotFound",
            Error::InvalidTransition { .. } => "InvalidTransition",
            Error::CommandFailed(_) => "CommandFailed",
            Error::IoError(_) | Error::Io(_) => "Io",
            Error::Database(_) => "Database",
            Error::Stage { .. } => "Stage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_stage_wraps_once() {
        let err = Error::MissingDependency("node".to_string())
            .in_stage("cdk8s", Stage::Install)
            .in_stage("cdk8s", Stage::Test);

        assert_eq!(err.stage(), Some(Stage::Install));
        assert!(matches!(err.kind(), Error::MissingDependency(name) if name == "node"));
        assert_eq!(
            err.to_string(),
            "cdk8s: install failed: dependency not installed: node"
        );
    }

    #[test]
    fn test_install_step_failed_display() {
        let err = Error::InstallStepFailed {
            index: 2,
            exit_code: Some(127),
            timed_out: false,
        };
        assert_eq!(err.to_string(), "install step 2 failed (exit code 127)");

        let err = Error::InstallStepFailed {
            index: 0,
            exit_code: None,
            timed_out: true,
        };
        assert_eq!(err.to_string(), "install step 0 failed (timed out)");
    }

    #[test]
    fn test_kind_name_looks_through_stage() {
        let err = Error::ChecksumMismatch {
            expected: "deadbeef".to_string(),
            actual: "00".to_string(),
        }
        .in_stage("cdk8s", Stage::Verify);
        assert_eq!(err.kind_name(), "ChecksumMismatch");
    }

    #[test]
    fn test_link_conflict_names_owner() {
        let err = Error::LinkConflict {
            link: "/opt/pantry/bin/tool".to_string(),
            owner: "alpha".to_string(),
        }
        .in_stage("beta", Stage::Install);
        assert_eq!(err.kind_name(), "LinkConflict");
        assert_eq!(
            err.to_string(),
            "beta: install failed: /opt/pantry/bin/tool is already linked by alpha"
        );
    }
}
