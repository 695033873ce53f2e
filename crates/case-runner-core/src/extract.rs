//! Example extraction from problem statements.

use crate::types::ExampleFragment;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised when a statement does not yield usable examples.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no examples found: content has no `Input:` or `Output:` markers")]
    NoExamples,
    #[error("found {outputs} output value(s) but no input values")]
    MissingInputs { outputs: usize },
    #[error("found {inputs} input value(s) but no output values")]
    MissingOutputs { inputs: usize },
}

/// Input and output fragments in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedExamples {
    pub inputs: Vec<ExampleFragment>,
    pub outputs: Vec<ExampleFragment>,
}

impl ExtractedExamples {
    /// Number of example blocks that produced at least one input fragment.
    #[must_use]
    pub fn example_count(&self) -> usize {
        self.inputs.last().map_or(0, |f| f.example)
    }

    /// Reject extractions that cannot form a suite.
    ///
    /// # Errors
    /// Returns an error if either sequence is empty.
    pub fn ensure_complete(&self) -> Result<(), ExtractionError> {
        match (self.inputs.is_empty(), self.outputs.is_empty()) {
            (true, true) => Err(ExtractionError::NoExamples),
            (true, false) => Err(ExtractionError::MissingInputs {
                outputs: self.outputs.len(),
            }),
            (false, true) => Err(ExtractionError::MissingOutputs {
                inputs: self.inputs.len(),
            }),
            (false, false) => Ok(()),
        }
    }
}

fn input_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bInput:[ \t]*(?:</strong>|</b>|\*\*)?[ \t]*([^\r\n]*)").ok())
        .as_ref()
}

fn output_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bOutput:(?:[ \t]*(?:</?[A-Za-z][^>]*>|\*\*))*[ \t]*([\w\[\],.\-]+)").ok()
    })
    .as_ref()
}

fn tag_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").ok())
        .as_ref()
}

fn assignment_start_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[A-Za-z_]\w*\s*=(?:[^=]|$)").ok())
        .as_ref()
}

/// Extract example inputs and outputs from a problem statement.
///
/// Each `Input:` line is split into one fragment per `name = value`
/// argument; each `Output:` value becomes one fragment. Quotes are stripped
/// from input fragments.
#[must_use]
pub fn extract(content: &str) -> ExtractedExamples {
    let (Some(input_re), Some(output_re)) = (input_regex(), output_regex()) else {
        return ExtractedExamples::default();
    };
    let content = decode_entities(content);
    let mut examples = ExtractedExamples::default();

    // Start offsets of every `Input:` marker, and of those with nothing to capture.
    let mut markers = Vec::new();
    let mut skipped = Vec::new();
    let mut example = 0;
    for cap in input_re.captures_iter(&content) {
        let start = cap.get(0).map_or(0, |m| m.start());
        markers.push(start);
        let raw = cap.get(1).map_or("", |m| m.as_str());
        let line = strip_tags(raw);
        let line = line.trim();
        if line.is_empty() {
            skipped.push(start);
            continue;
        }
        example += 1;
        for argument in split_arguments(line) {
            let text = argument.replace('"', "").trim().to_string();
            if text.is_empty() {
                continue;
            }
            examples.inputs.push(ExampleFragment {
                ordinal: examples.inputs.len() + 1,
                example,
                text,
            });
        }
    }

    for cap in output_re.captures_iter(&content) {
        let start = cap.get(0).map_or(0, |m| m.start());
        let text = cap.get(1).map_or("", |m| m.as_str()).trim();
        // An output belongs to the closest `Input:` marker above it.
        let owner = markers
            .partition_point(|&m| m < start)
            .checked_sub(1)
            .and_then(|i| markers.get(i));
        if owner.is_some_and(|m| skipped.contains(m)) {
            tracing::debug!(output = text, "skipping output of an example without input");
            continue;
        }
        let ordinal = examples.outputs.len() + 1;
        examples.outputs.push(ExampleFragment {
            ordinal,
            example: ordinal,
            text: text.to_string(),
        });
    }

    tracing::debug!(
        inputs = examples.inputs.len(),
        outputs = examples.outputs.len(),
        "extracted example fragments"
    );
    examples
}

/// Split an input line at top-level commas that start a new `name =` argument.
#[must_use]
pub fn split_arguments(line: &str) -> Vec<String> {
    let Some(assignment) = assignment_start_regex() else {
        return vec![line.trim().to_string()];
    };

    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '[' | '(' | '{' if !in_quotes => depth += 1,
            ']' | ')' | '}' if !in_quotes => depth -= 1,
            ',' if !in_quotes && depth <= 0 && assignment.is_match(&line[i + 1..]) => {
                parts.push(line[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(line[start..].trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

fn strip_tags(text: &str) -> String {
    tag_regex().map_or_else(
        || text.to_string(),
        |re| re.replace_all(text, "").into_owned(),
    )
}

/// Decode the HTML entities that show up in rendered problem statements.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
