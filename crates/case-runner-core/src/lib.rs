//! Core library for the case-runner CLI.
//!
//! This crate turns a problem statement into a runnable test suite and
//! judges a solution against it:
//! - Example extraction from HTML or Markdown statements
//! - Grouping of argument fragments into fixed-arity test cases
//! - On-disk test case storage (`input_<i>.txt` / `output_<i>.txt`)
//! - Out-of-process compile and run with deadlines and process-group kill
//! - Exact trimmed-string comparison
//! - Report generation (text and JSON)

pub mod compare;
pub mod config;
pub mod executor;
pub mod extract;
pub mod group;
pub mod language;
pub mod process;
pub mod report;
pub mod reporter;
pub mod runner;
pub mod store;
pub mod types;

pub use compare::{Judgment, compare, outputs_match, verdict};
pub use config::{
    CONFIG_FILE_NAME, CaseRunnerConfig, ConfigError, ConfigOverrides, apply_overrides,
    load_config, validate_config,
};
pub use executor::{DEFAULT_COMPILE_TIMEOUT, Executor};
pub use extract::{ExtractedExamples, ExtractionError, extract};
pub use group::{GroupDiagnostic, GroupError, Grouping, GroupingOptions, detect_arity, group};
pub use language::{CommandTemplate, LanguageRuntime, TemplateVars, Toolchains, canonical_tag};
pub use report::{ReportFormat, RunReport, format_json};
pub use reporter::{Reporter, ReporterConfig, format_report};
pub use runner::{
    PrepareError, PreparedSuite, ProgressEvent, ProgressSender, prepare, prepare_suite, run_case,
    run_suite,
};
pub use store::{StoreError, load, load_any, load_json, persist};
pub use types::*;
