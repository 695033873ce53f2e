//! Suite preparation and sequential execution.

use crate::compare::verdict;
use crate::executor::Executor;
use crate::extract::{ExtractionError, extract};
use crate::group::{GroupError, Grouping, GroupingOptions, group};
use crate::store::{StoreError, persist};
use crate::types::{GroupedTestCase, RunSummary, SolutionArtifact, Verdict};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The run is starting.
    SuiteStarted { total: usize },
    /// A case is about to be executed.
    CaseStarted { index: usize, total: usize },
    /// A case has been judged.
    CaseCompleted {
        index: usize,
        total: usize,
        verdict: Verdict,
    },
    /// Every case has been judged.
    SuiteCompleted { summary: RunSummary },
}

/// Sender for progress events.
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Batch-fatal errors raised before any execution starts.
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("grouping failed: {0}")]
    Group(#[from] GroupError),
    #[error("no complete test case could be formed from the examples")]
    Empty,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// A suite that has been extracted, grouped and written to disk.
#[derive(Debug, Clone)]
pub struct PreparedSuite {
    pub dir: PathBuf,
    pub grouping: Grouping,
    pub written: Vec<PathBuf>,
}

/// Extract and group examples from problem content.
///
/// # Errors
/// Returns an error if:
/// - The content has no usable examples
/// - Grouping fails under the given options
/// - No complete test case remains
pub fn prepare(content: &str, options: &GroupingOptions) -> Result<Grouping, PrepareError> {
    let examples = extract(content);
    examples.ensure_complete()?;
    let grouping = group(&examples.inputs, &examples.outputs, options)?;
    if grouping.cases.is_empty() {
        return Err(PrepareError::Empty);
    }
    tracing::debug!(
        examples = examples.example_count(),
        arity = grouping.arity,
        cases = grouping.cases.len(),
        "prepared test cases"
    );
    Ok(grouping)
}

/// [`prepare`] and persist the result to `dir`.
///
/// # Errors
/// Returns an error if preparation fails or the files cannot be written.
pub fn prepare_suite(
    content: &str,
    dir: &Path,
    options: &GroupingOptions,
) -> Result<PreparedSuite, PrepareError> {
    let grouping = prepare(content, options)?;
    let written = persist(dir, &grouping.cases)?;
    Ok(PreparedSuite {
        dir: dir.to_path_buf(),
        grouping,
        written,
    })
}

/// Execute and judge one case.
pub async fn run_case(
    executor: &Executor,
    solution: &SolutionArtifact,
    case: &GroupedTestCase,
    deadline: Duration,
) -> Verdict {
    let outcome = executor.run(solution, &case.input, deadline).await;
    tracing::debug!(index = case.index, ?outcome, "case finished");
    verdict(case, &outcome)
}

/// Execute every case in order, one at a time.
///
/// Per-case failures become `Errored` verdicts; the run never aborts early.
pub async fn run_suite(
    executor: &Executor,
    solution: &SolutionArtifact,
    cases: &[GroupedTestCase],
    deadline: Duration,
    progress: Option<&ProgressSender>,
) -> Vec<Verdict> {
    let total = cases.len();
    emit(progress, ProgressEvent::SuiteStarted { total });

    let mut verdicts = Vec::with_capacity(total);
    for case in cases {
        emit(
            progress,
            ProgressEvent::CaseStarted {
                index: case.index,
                total,
            },
        );
        let verdict = run_case(executor, solution, case, deadline).await;
        emit(
            progress,
            ProgressEvent::CaseCompleted {
                index: case.index,
                total,
                verdict: verdict.clone(),
            },
        );
        verdicts.push(verdict);
    }

    emit(
        progress,
        ProgressEvent::SuiteCompleted {
            summary: RunSummary::from_verdicts(&verdicts),
        },
    );
    verdicts
}

fn emit(progress: Option<&ProgressSender>, event: ProgressEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}
