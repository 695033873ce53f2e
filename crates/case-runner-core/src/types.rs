//! Core data types for case-runner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One raw value captured from a problem statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleFragment {
    /// 1-based position within its sequence (inputs or outputs).
    pub ordinal: usize,
    /// 1-based number of the example block the value was captured from.
    pub example: usize,
    pub text: String,
}

/// One complete input/expected-output pair ready for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedTestCase {
    /// 1-based, sequential and gapless within a suite.
    pub index: usize,
    pub input: String,
    pub expected: String,
}

/// What to do with input fragments that do not fill a whole group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncompletePolicy {
    /// Discard the trailing fragments and record a diagnostic.
    #[default]
    Drop,
    /// Abort grouping with an error.
    Fail,
}

impl std::str::FromStr for IncompletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "fail" => Ok(Self::Fail),
            _ => Err(format!("unknown policy: {s}. Valid policies: drop, fail")),
        }
    }
}

/// A user solution on disk and the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionArtifact {
    pub path: PathBuf,
    pub language: String,
}

impl SolutionArtifact {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
        }
    }
}

/// Classified result of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The run step exited successfully; holds trimmed stdout.
    Success(String),
    /// The compile step failed; holds the compiler diagnostics.
    CompileFailure(String),
    /// The run step exited unsuccessfully; holds captured stderr.
    RuntimeFailure(String),
    /// The run step exceeded its deadline and was killed.
    Timeout { deadline_ms: u64 },
    /// No toolchain recipe exists for the language tag.
    UnsupportedLanguage(String),
}

impl ExecutionOutcome {
    /// Short label for the failure kind, `None` for success.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<&'static str> {
        match self {
            Self::Success(_) => None,
            Self::CompileFailure(_) => Some("compile error"),
            Self::RuntimeFailure(_) => Some("runtime error"),
            Self::Timeout { .. } => Some("timeout"),
            Self::UnsupportedLanguage(_) => Some("unsupported language"),
        }
    }

    /// Failure detail as shown to the user, `None` for success.
    #[must_use]
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::CompileFailure(detail) | Self::RuntimeFailure(detail) => Some(detail.clone()),
            Self::Timeout { deadline_ms } => Some(format!("timed out after {deadline_ms}ms")),
            Self::UnsupportedLanguage(tag) => Some(format!("no toolchain for language '{tag}'")),
        }
    }
}

/// Comparison result for one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Errored,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Errored => "errored",
        };
        f.write_str(label)
    }
}

/// Final verdict for one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub index: usize,
    pub status: Status,
    pub input: String,
    pub expected: String,
    /// Solution output; absent when execution did not succeed.
    pub actual: Option<String>,
    /// Failure kind for errored cases (`timeout`, `compile error`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Counts over a set of verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let count = |status: Status| verdicts.iter().filter(|v| v.status == status).count();
        Self {
            total: verdicts.len(),
            passed: count(Status::Pass),
            failed: count(Status::Fail),
            errored: count(Status::Errored),
        }
    }

    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}
