// src/recipe/kitchen/taste.rs

//! Acceptance test evaluation

use crate::error::{Error, Result, Stage};
use crate::process::ProcessOutput;
use crate::recipe::format::TestSection;
use serde::Serialize;

/// Outcome of running a recipe's test command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub recipe: String,
    pub passed: bool,
    /// stdout followed by stderr
    pub output: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Human-readable expectations, e.g. `output containing "ok"`
    pub expected: Vec<String>,
    pub expected_exit_code: Option<i32>,
    /// Expectations that did not hold
    pub failures: Vec<String>,
}

impl TestResult {
    /// Check captured output against the test's expectations
    pub fn evaluate(recipe: &str, test: &TestSection, output: ProcessOutput) -> Self {
        let combined = output.combined();
        let assertions = test.assertions();
        let mut failures = Vec::new();

        if output.timed_out {
            failures.push("test command timed out".to_string());
        }

        for assertion in &assertions {
            if !assertion.check(&combined) {
                failures.push(format!("missing {}", assertion));
            }
        }

        if let Some(expected) = test.exit_code
            && output.exit_code != Some(expected)
        {
            failures.push(match output.exit_code {
                Some(code) => format!("exit status {}, expected {}", code, expected),
                None => format!("killed by signal, expected exit status {}", expected),
            });
        }

        Self {
            recipe: recipe.to_string(),
            passed: failures.is_empty(),
            output: combined,
            exit_code: output.exit_code,
            timed_out: output.timed_out,
            expected: assertions.iter().map(|a| a.to_string()).collect(),
            expected_exit_code: test.exit_code,
            failures,
        }
    }

    /// Expectations as one line, for error messages
    pub fn describe_expected(&self) -> String {
        let mut parts = self.expected.clone();
        if let Some(code) = self.expected_exit_code {
            parts.push(format!("exit status {}", code));
        }
        if parts.is_empty() {
            "no expectations".to_string()
        } else {
            parts.join(" and ")
        }
    }

    /// Turn a failed result into `TestFailed`
    pub fn into_result(self) -> Result<Self> {
        if self.passed {
            return Ok(self);
        }
        Err(Error::TestFailed {
            expected: self.describe_expected(),
            actual: self.output.clone(),
        }
        .in_stage(&self.recipe, Stage::Test))
    }
}
