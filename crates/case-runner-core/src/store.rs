//! On-disk test case store.
//!
//! A suite directory holds `input_<i>.txt` / `output_<i>.txt` pairs with
//! 1-based gapless indices.

use crate::types::GroupedTestCase;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while persisting or loading a suite.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no test cases found in {}", path.display())]
    NoCases { path: PathBuf },
    #[error("input_{index}.txt has no matching output_{index}.txt")]
    MissingOutput { index: usize },
    #[error("output_{index}.txt has no matching input_{index}.txt")]
    MissingInput { index: usize },
    #[error("test case indices are not contiguous: expected {expected}, found {found}")]
    IndexGap { expected: usize, found: usize },
}

fn case_file_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(input|output)_(\d+)\.txt$").ok())
        .as_ref()
}

fn input_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("input_{index}.txt"))
}

fn output_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("output_{index}.txt"))
}

/// Persist a suite, replacing whatever suite the directory held before.
///
/// Returns the written paths, input before output for each case.
///
/// # Errors
/// Returns an error if the directory cannot be created or a file cannot be
/// written or removed.
pub fn persist(dir: &Path, cases: &[GroupedTestCase]) -> Result<Vec<PathBuf>, StoreError> {
    std::fs::create_dir_all(dir).map_err(|source| StoreError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(cases.len() * 2);
    for case in cases {
        let input = input_path(dir, case.index);
        write_atomic(dir, &input, &case.input)?;
        written.push(input);

        let output = output_path(dir, case.index);
        write_atomic(dir, &output, &case.expected)?;
        written.push(output);
    }

    remove_stale(dir, cases.len())?;
    tracing::debug!(dir = %dir.display(), cases = cases.len(), "persisted test cases");
    Ok(written)
}

/// Write via a temporary file in the same directory, renamed into place.
fn write_atomic(dir: &Path, path: &Path, contents: &str) -> Result<(), StoreError> {
    let to_write_error = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(dir).map_err(to_write_error)?;
    file.write_all(contents.as_bytes()).map_err(to_write_error)?;
    if !contents.ends_with('\n') {
        file.write_all(b"\n").map_err(to_write_error)?;
    }
    file.flush().map_err(to_write_error)?;
    file.persist(path).map_err(|e| to_write_error(e.error))?;
    Ok(())
}

fn remove_stale(dir: &Path, count: usize) -> Result<(), StoreError> {
    for (_, index, path) in scan(dir)?.into_iter().filter(|(_, i, _)| *i > count) {
        tracing::debug!(index, path = %path.display(), "removing stale test case file");
        std::fs::remove_file(&path).map_err(|source| StoreError::Write { path, source })?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseFileKind {
    Input,
    Output,
}

/// List every case file in `dir` with its kind and index.
fn scan(dir: &Path) -> Result<Vec<(CaseFileKind, usize, PathBuf)>, StoreError> {
    let Some(re) = case_file_regex() else {
        return Ok(Vec::new());
    };
    let entries = std::fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(caps) = re.captures(&name) else {
            continue;
        };
        let kind = if caps.get(1).is_some_and(|m| m.as_str() == "input") {
            CaseFileKind::Input
        } else {
            CaseFileKind::Output
        };
        if let Some(index) = caps.get(2).and_then(|m| m.as_str().parse::<usize>().ok()) {
            files.push((kind, index, entry.path()));
        }
    }
    Ok(files)
}

/// Load a suite directory in ascending numeric index order.
///
/// # Errors
/// Returns an error if:
/// - The directory cannot be read
/// - It contains no case files
/// - An input has no output partner, or vice versa
/// - Indices do not run gaplessly from 1
pub fn load(dir: &Path) -> Result<Vec<GroupedTestCase>, StoreError> {
    let mut inputs: BTreeMap<usize, PathBuf> = BTreeMap::new();
    let mut outputs: BTreeMap<usize, PathBuf> = BTreeMap::new();
    for (kind, index, path) in scan(dir)? {
        match kind {
            CaseFileKind::Input => inputs.insert(index, path),
            CaseFileKind::Output => outputs.insert(index, path),
        };
    }

    if inputs.is_empty() && outputs.is_empty() {
        return Err(StoreError::NoCases {
            path: dir.to_path_buf(),
        });
    }
    if let Some(index) = outputs.keys().find(|i| !inputs.contains_key(*i)) {
        return Err(StoreError::MissingInput { index: *index });
    }

    let mut cases = Vec::with_capacity(inputs.len());
    for (expected, (index, input)) in (1..).zip(&inputs) {
        if *index != expected {
            return Err(StoreError::IndexGap {
                expected,
                found: *index,
            });
        }
        let Some(output) = outputs.get(index) else {
            return Err(StoreError::MissingOutput { index: *index });
        };
        cases.push(GroupedTestCase {
            index: *index,
            input: read_trimmed(input)?,
            expected: read_trimmed(output)?,
        });
    }

    tracing::debug!(dir = %dir.display(), cases = cases.len(), "loaded test cases");
    Ok(cases)
}

fn read_trimmed(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Deserialize)]
struct JsonCase {
    input: String,
    output: String,
}

/// Load a legacy `testcases.json` file: an array of `{input, output}` objects.
///
/// # Errors
/// Returns an error if the file cannot be read, is not the expected shape,
/// or holds an empty array.
pub fn load_json(path: &Path) -> Result<Vec<GroupedTestCase>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Vec<JsonCase> = serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.is_empty() {
        return Err(StoreError::NoCases {
            path: path.to_path_buf(),
        });
    }

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, case)| GroupedTestCase {
            index: i + 1,
            input: case.input.trim().to_string(),
            expected: case.output.trim().to_string(),
        })
        .collect())
}

/// Load a suite from a directory or a `.json` file.
///
/// # Errors
/// Propagates errors from [`load`] or [`load_json`].
pub fn load_any(path: &Path) -> Result<Vec<GroupedTestCase>, StoreError> {
    if path.is_dir() {
        return load(path);
    }
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        return load_json(path);
    }
    Err(StoreError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "expected a test case directory or a .json file",
        ),
    })
}
