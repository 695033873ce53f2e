//! Machine-readable report generation.

use crate::types::{RunSummary, Verdict};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Format for report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown format: {s}. Valid formats: table, json")),
        }
    }
}

/// A complete run, as serialized by `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// RFC 3339 UTC timestamp.
    pub generated_at: String,
    pub solution: String,
    pub language: String,
    pub verdicts: Vec<Verdict>,
    pub summary: RunSummary,
}

impl RunReport {
    /// Build a report stamped with the current UTC time.
    #[must_use]
    pub fn new(solution: &str, language: &str, verdicts: Vec<Verdict>) -> Self {
        Self {
            generated_at: now_rfc3339(),
            solution: solution.to_string(),
            language: language.to_string(),
            summary: RunSummary::from_verdicts(&verdicts),
            verdicts,
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Generate the JSON report.
#[must_use]
pub fn format_json(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
