//! Grouping of extracted fragments into fixed-arity test cases.
//!
//! Arity comes from the first example: the number of `=` characters in its
//! input line, following the `name = value` argument convention. The
//! heuristic miscounts when the first example is malformed or when argument
//! values contain `=` themselves; callers that know better pass an explicit
//! arity.

use crate::types::{ExampleFragment, GroupedTestCase, IncompletePolicy};
use thiserror::Error;

/// Errors that make grouping batch-fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("arity must be at least 1")]
    ZeroArity,
    #[error(
        "{leftover} trailing input fragment(s) do not fill a group of arity {arity}: {}",
        fragments.join(" | ")
    )]
    Incomplete {
        arity: usize,
        leftover: usize,
        fragments: Vec<String>,
    },
    #[error("{groups} complete test case(s) but only {outputs} output value(s)")]
    MissingOutputs { groups: usize, outputs: usize },
    #[error("{outputs} output value(s) but only {groups} complete test case(s)")]
    UnpairedOutputs { groups: usize, outputs: usize },
}

/// Non-fatal findings recorded while grouping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupDiagnostic {
    #[error("first example has no `name = value` arguments; using arity 1")]
    ArityFallback,
    #[error(
        "dropped {} trailing input fragment(s) that do not fill a group of arity {arity}: {}",
        dropped.len(),
        dropped.join(" | ")
    )]
    IncompleteGroupDropped { arity: usize, dropped: Vec<String> },
    #[error(
        "dropped {} output value(s) without a matching test case: {}",
        dropped.len(),
        dropped.join(" | ")
    )]
    UnpairedOutputsDropped { dropped: Vec<String> },
}

/// Options controlling grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingOptions {
    /// Explicit arity; detected from the first example when `None`.
    pub arity: Option<usize>,
    pub on_incomplete: IncompletePolicy,
}

/// Grouped test cases plus the diagnostics produced on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub arity: usize,
    pub cases: Vec<GroupedTestCase>,
    pub diagnostics: Vec<GroupDiagnostic>,
}

/// Count `=` characters across the fragments of the first example.
///
/// Returns 0 for an empty slice or when the first example has no `=`.
#[must_use]
pub fn detect_arity(inputs: &[ExampleFragment]) -> usize {
    let Some(first) = inputs.first() else {
        return 0;
    };
    inputs
        .iter()
        .take_while(|f| f.example == first.example)
        .map(|f| f.text.matches('=').count())
        .sum()
}

/// Group input fragments into test cases and pair them with outputs.
///
/// # Errors
/// Returns an error if:
/// - An explicit arity of zero is given
/// - Trailing fragments are left over and the policy is `Fail`
/// - There are fewer outputs than complete groups
/// - There are more outputs than complete groups and the policy is `Fail`
pub fn group(
    inputs: &[ExampleFragment],
    outputs: &[ExampleFragment],
    options: &GroupingOptions,
) -> Result<Grouping, GroupError> {
    let mut diagnostics = Vec::new();

    let arity = match options.arity {
        Some(0) => return Err(GroupError::ZeroArity),
        Some(arity) => arity,
        None => match detect_arity(inputs) {
            0 => {
                if !inputs.is_empty() {
                    diagnostics.push(GroupDiagnostic::ArityFallback);
                }
                1
            }
            detected => detected,
        },
    };

    let chunks = inputs.chunks_exact(arity);
    let remainder: Vec<String> = chunks.remainder().iter().map(|f| f.text.clone()).collect();
    let groups: Vec<&[ExampleFragment]> = chunks.collect();

    if !remainder.is_empty() {
        match options.on_incomplete {
            IncompletePolicy::Fail => {
                return Err(GroupError::Incomplete {
                    arity,
                    leftover: remainder.len(),
                    fragments: remainder,
                });
            }
            IncompletePolicy::Drop => {
                diagnostics.push(GroupDiagnostic::IncompleteGroupDropped {
                    arity,
                    dropped: remainder,
                });
            }
        }
    }

    if outputs.len() < groups.len() {
        return Err(GroupError::MissingOutputs {
            groups: groups.len(),
            outputs: outputs.len(),
        });
    }
    if outputs.len() > groups.len() {
        if options.on_incomplete == IncompletePolicy::Fail {
            return Err(GroupError::UnpairedOutputs {
                groups: groups.len(),
                outputs: outputs.len(),
            });
        }
        diagnostics.push(GroupDiagnostic::UnpairedOutputsDropped {
            dropped: outputs[groups.len()..]
                .iter()
                .map(|f| f.text.clone())
                .collect(),
        });
    }

    for diagnostic in &diagnostics {
        tracing::debug!("{diagnostic}");
    }

    let cases = groups
        .iter()
        .zip(outputs)
        .enumerate()
        .map(|(i, (chunk, output))| GroupedTestCase {
            index: i + 1,
            input: chunk
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            expected: output.text.clone(),
        })
        .collect();

    Ok(Grouping {
        arity,
        cases,
        diagnostics,
    })
}
