//! Verdict judgment for a single test case.
//!
//! Comparison is exact string equality after trimming surrounding
//! whitespace. It is case-sensitive and internal whitespace is significant,
//! so `[0, 1]` does not match `[0,1]` and `[1,0]` does not match `[0,1]`.

use crate::types::{ExecutionOutcome, GroupedTestCase, Status, Verdict};

/// Status plus a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub status: Status,
    pub detail: Option<String>,
}

/// Whether `actual` matches `expected` under the trimmed-equality policy.
#[must_use]
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}

/// Judge one execution outcome against the expected output.
///
/// # Truth Table
/// | outcome                 | trimmed equal | -> Status |
/// |-------------------------|---------------|-----------|
/// | anything but `Success`  | *             | Errored   |
/// | `Success`               | false         | Fail      |
/// | `Success`               | true          | Pass      |
#[must_use]
pub fn compare(outcome: &ExecutionOutcome, expected: &str) -> Judgment {
    match outcome {
        ExecutionOutcome::Success(actual) if outputs_match(actual, expected) => Judgment {
            status: Status::Pass,
            detail: None,
        },
        ExecutionOutcome::Success(actual) => Judgment {
            status: Status::Fail,
            detail: Some(format!(
                "expected `{}`, got `{}`",
                expected.trim(),
                actual.trim()
            )),
        },
        other => Judgment {
            status: Status::Errored,
            detail: other.failure_detail(),
        },
    }
}

/// Build the verdict for `case` from its execution outcome.
#[must_use]
pub fn verdict(case: &GroupedTestCase, outcome: &ExecutionOutcome) -> Verdict {
    let judgment = compare(outcome, &case.expected);
    let actual = match outcome {
        ExecutionOutcome::Success(actual) => Some(actual.trim().to_string()),
        _ => None,
    };
    let (kind, detail) = match judgment.status {
        Status::Pass => (None, None),
        Status::Fail => (None, judgment.detail),
        Status::Errored => (
            outcome.failure_kind().map(ToString::to_string),
            judgment.detail,
        ),
    };
    Verdict {
        index: case.index,
        status: judgment.status,
        input: case.input.clone(),
        expected: case.expected.trim().to_string(),
        actual,
        kind,
        detail,
    }
}
