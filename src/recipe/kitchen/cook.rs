// src/recipe/kitchen/cook.rs

//! Cook: lifecycle of a single recipe
//!
//! A Cook walks one recipe through `Loaded -> Fetched -> Verified ->
//! Installed -> Tested`. Transitions only move forward, one stage at a
//! time. The first failure moves the cook into the terminal `Failed` state
//! and every later call is rejected.

use crate::db::models::BinaryLink;
use crate::error::{Error, Result, Stage};
use crate::recipe::format::Recipe;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{InstallContext, Kitchen, TestResult};

/// Where a recipe is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeState {
    Loaded,
    Fetched,
    Verified,
    Installed,
    Tested,
    /// Terminal; records where it failed and the failure kind
    Failed { stage: Stage, kind: &'static str },
}

impl RecipeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecipeState::Tested | RecipeState::Failed { .. })
    }

    /// The only state this one may advance to
    fn successor(&self) -> Option<RecipeState> {
        match self {
            RecipeState::Loaded => Some(RecipeState::Fetched),
            RecipeState::Fetched => Some(RecipeState::Verified),
            RecipeState::Verified => Some(RecipeState::Installed),
            RecipeState::Installed => Some(RecipeState::Tested),
            RecipeState::Tested | RecipeState::Failed { .. } => None,
        }
    }
}

impl fmt::Display for RecipeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeState::Loaded => f.write_str("loaded"),
            RecipeState::Fetched => f.write_str("fetched"),
            RecipeState::Verified => f.write_str("verified"),
            RecipeState::Installed => f.write_str("installed"),
            RecipeState::Tested => f.write_str("tested"),
            RecipeState::Failed { stage, kind } => write!(f, "failed at {} ({})", stage, kind),
        }
    }
}

/// Outcome of a full cook
#[derive(Debug, Clone)]
pub struct CookResult {
    pub name: String,
    pub version: String,
    pub prefix: PathBuf,
    /// Verified source artifact in the download cache
    pub artifact: PathBuf,
    pub links: Vec<BinaryLink>,
    /// Present when the test was requested
    pub test: Option<TestResult>,
}

/// A single recipe moving through its lifecycle
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: Recipe,
    state: RecipeState,
    artifact: Option<PathBuf>,
    context: Option<InstallContext>,
    links: Vec<BinaryLink>,
    test_result: Option<TestResult>,
}

impl<'a> Cook<'a> {
    pub fn new(kitchen: &'a Kitchen, recipe: Recipe) -> Self {
        Self {
            kitchen,
            recipe,
            state: RecipeState::Loaded,
            artifact: None,
            context: None,
            links: Vec::new(),
            test_result: None,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn state(&self) -> &RecipeState {
        &self.state
    }

    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    pub fn context(&self) -> Option<&InstallContext> {
        self.context.as_ref()
    }

    pub fn test_result(&self) -> Option<&TestResult> {
        self.test_result.as_ref()
    }

    fn advance(&mut self, to: RecipeState, stage: Stage) -> Result<()> {
        if self.state.successor().as_ref() != Some(&to) {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            }
            .in_stage(&self.recipe.name, stage));
        }
        self.state = to;
        Ok(())
    }

    /// Record a failure and return it wrapped with recipe and stage
    fn fail(&mut self, stage: Stage, err: Error) -> Error {
        let err = err.in_stage(&self.recipe.name, stage);
        self.state = RecipeState::Failed {
            stage: err.stage().unwrap_or(stage),
            kind: err.kind_name(),
        };
        err
    }

    /// Phase 1: Prep - download the source, then verify it
    pub fn fetch(&mut self) -> Result<&Path> {
        if self.state != RecipeState::Loaded {
            return Err(self.reject(RecipeState::Fetched, Stage::Fetch));
        }

        info!("Prep: fetching {}", self.recipe.url);
        let staged = match self.kitchen.download(&self.recipe) {
            Ok(path) => path,
            Err(e) => return Err(self.fail(Stage::Fetch, e)),
        };
        self.advance(RecipeState::Fetched, Stage::Fetch)?;

        let verified = match self.kitchen.verify(&self.recipe, &staged) {
            Ok(path) => path,
            Err(e) => return Err(self.fail(Stage::Verify, e)),
        };
        self.advance(RecipeState::Verified, Stage::Verify)?;

        Ok(self.artifact.insert(verified).as_path())
    }

    /// Phase 2: Simmer - run install steps in the given context
    pub fn install(&mut self, context: InstallContext) -> Result<()> {
        let artifact = match (&self.state, &self.artifact) {
            (RecipeState::Verified, Some(artifact)) => artifact.clone(),
            _ => return Err(self.reject(RecipeState::Installed, Stage::Install)),
        };

        info!("Simmering: installing into {}", context.prefix().display());
        match self.kitchen.install(&self.recipe, &artifact, &context) {
            Ok(installed) => self.links = installed.links,
            Err(e) => {
                // Completed steps are not rolled back; keep the prefix for
                // inspection.
                if context.is_scratch() {
                    context.persist();
                }
                return Err(self.fail(Stage::Install, e));
            }
        }

        self.context = Some(context);
        self.advance(RecipeState::Installed, Stage::Install)
    }

    /// Phase 3: Taste - run the acceptance test
    ///
    /// A failed assertion is not an error here: the result says whether it
    /// passed, and the cook becomes `Failed` with kind `TestFailed`.
    pub fn test(&mut self) -> Result<&TestResult> {
        let Some(context) = self.context.as_ref().filter(|_| self.state == RecipeState::Installed) else {
            return Err(self.reject(RecipeState::Tested, Stage::Test));
        };

        info!("Tasting: running test for {}", self.recipe.name);
        let result = match self.kitchen.test(&self.recipe, context) {
            Ok(result) => result,
            Err(e) => return Err(self.fail(Stage::Test, e)),
        };

        if result.passed {
            self.advance(RecipeState::Tested, Stage::Test)?;
        } else {
            self.state = RecipeState::Failed {
                stage: Stage::Test,
                kind: "TestFailed",
            };
        }

        Ok(self.test_result.insert(result))
    }

    fn reject(&self, to: RecipeState, stage: Stage) -> Error {
        Error::InvalidTransition {
            from: self.state.to_string(),
            to: to.to_string(),
        }
        .in_stage(&self.recipe.name, stage)
    }

    /// Summarize a cook that reached at least `Installed`
    pub fn finish(mut self) -> Result<CookResult> {
        let (Some(artifact), Some(context)) = (self.artifact.take(), self.context.take()) else {
            return Err(self.reject(RecipeState::Installed, Stage::Install));
        };

        if let Some(result) = &self.test_result {
            result.clone().into_result()?;
        }

        let prefix = if context.is_scratch() {
            context.persist()
        } else {
            context.prefix().to_path_buf()
        };

        Ok(CookResult {
            name: self.recipe.name.clone(),
            version: self.recipe.version(),
            prefix,
            artifact,
            links: self.links,
            test: self.test_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_is_linear() {
        let order = [
            RecipeState::Loaded,
            RecipeState::Fetched,
            RecipeState::Verified,
            RecipeState::Installed,
            RecipeState::Tested,
        ];
        for pair in order.windows(2) {
            assert_eq!(pair[0].successor().as_ref(), Some(&pair[1]));
        }
        assert!(RecipeState::Tested.successor().is_none());
        assert!(
            RecipeState::Failed { stage: Stage::Fetch, kind: "FetchError" }
                .successor()
                .is_none()
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RecipeState::Verified.to_string(), "verified");
        assert_eq!(
            RecipeState::Failed {
                stage: Stage::Verify,
                kind: "ChecksumMismatch"
            }
            .to_string(),
            "failed at verify (ChecksumMismatch)"
        );
    }
}
