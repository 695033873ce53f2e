//! Test output reporter with cargo test-like formatting.

use crate::types::{RunSummary, Status, Verdict};
use std::io::{self, Stderr, Stdout, Write};
use std::time::Duration;

/// Reporter configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReporterConfig {
    /// Show input and output for passing cases too.
    pub verbose: bool,
    /// Use colors in output.
    pub color: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            color: true,
        }
    }
}

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// Push `label` followed by `value`, continuing multi-line values on
/// indented lines.
fn push_field(out: &mut String, label: &str, value: &str) {
    let mut lines = value.lines();
    let first = lines.next().unwrap_or("");
    out.push_str(&format!("    {label:<10}{first}\n"));
    for line in lines {
        out.push_str(&format!("    {:<10}{line}\n", ""));
    }
}

/// Format one case: the status line plus an indented block for failures.
#[must_use]
pub fn format_case(verdict: &Verdict, config: &ReporterConfig) -> String {
    let status = match verdict.status {
        Status::Pass => paint("ok", GREEN, config.color),
        Status::Fail => paint("FAILED", RED, config.color),
        Status::Errored => {
            let label = verdict
                .kind
                .as_deref()
                .map_or_else(|| "ERROR".to_string(), |kind| format!("ERROR ({kind})"));
            paint(&label, YELLOW, config.color)
        }
    };

    let mut out = format!("test case {} ... {status}\n", verdict.index);
    if verdict.status == Status::Pass && !config.verbose {
        return out;
    }

    push_field(&mut out, "input:", &verdict.input);
    push_field(&mut out, "expected:", &verdict.expected);
    if let Some(actual) = &verdict.actual {
        push_field(&mut out, "actual:", actual);
    }
    if verdict.status == Status::Errored {
        if let Some(detail) = &verdict.detail {
            push_field(&mut out, "detail:", detail);
        }
    }
    out
}

/// Format the summary line.
#[must_use]
pub fn format_summary(summary: &RunSummary, config: &ReporterConfig) -> String {
    let status = if summary.all_passed() {
        paint("ok", GREEN, config.color)
    } else {
        paint("FAILED", RED, config.color)
    };
    format!(
        "test result: {status}. {} passed; {} failed; {} errored",
        summary.passed, summary.failed, summary.errored
    )
}

/// Format a full report: one entry per case in index order, then the summary.
#[must_use]
pub fn format_report(verdicts: &[Verdict], config: &ReporterConfig) -> String {
    let mut ordered: Vec<&Verdict> = verdicts.iter().collect();
    ordered.sort_by_key(|v| v.index);

    let mut out = String::new();
    for verdict in ordered {
        out.push_str(&format_case(verdict, config));
    }
    out.push('\n');
    out.push_str(&format_summary(&RunSummary::from_verdicts(verdicts), config));
    out.push('\n');
    out
}

/// Writes reports to `out` and diagnostics to `err`.
pub struct Reporter<W: Write, E: Write> {
    out: W,
    err: E,
    config: ReporterConfig,
}

impl Reporter<Stdout, Stderr> {
    /// Reporter over the process's stdout and stderr.
    #[must_use]
    pub fn stdio(config: ReporterConfig) -> Self {
        Self::new(io::stdout(), io::stderr(), config)
    }
}

impl<W: Write, E: Write> Reporter<W, E> {
    #[must_use]
    pub const fn new(out: W, err: E, config: ReporterConfig) -> Self {
        Self { out, err, config }
    }

    #[must_use]
    pub const fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Print the start of a run.
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written.
    pub fn suite_start(&mut self, case_count: usize, solution: &str) -> io::Result<()> {
        let noun = if case_count == 1 { "case" } else { "cases" };
        writeln!(self.out)?;
        writeln!(self.out, "running {case_count} test {noun} against {solution}")
    }

    /// Print every verdict and the summary line.
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written.
    pub fn report(&mut self, verdicts: &[Verdict], elapsed: Option<Duration>) -> io::Result<()> {
        let report = format_report(verdicts, &self.config);
        match elapsed {
            Some(elapsed) => writeln!(
                self.out,
                "{}; finished in {:.1}s",
                report.trim_end(),
                elapsed.as_secs_f64()
            )?,
            None => write!(self.out, "{report}")?,
        }
        self.out.flush()
    }

    /// Print a progress line for a finished case (only in verbose mode).
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written.
    pub fn progress(&mut self, index: usize, total: usize, status: Status) -> io::Result<()> {
        if self.config.verbose {
            writeln!(self.err, "  [{index}/{total}] {status}")?;
        }
        Ok(())
    }

    /// Print a line to the output sink.
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written.
    pub fn line(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    /// Print a warning message.
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written.
    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(
            self.err,
            "{}: {message}",
            paint("warning", YELLOW, self.config.color)
        )
    }

    /// Print an error message.
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(
            self.err,
            "{}: {message}",
            paint("error", RED, self.config.color)
        )
    }

    /// Consume the reporter, returning its sinks.
    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }
}
