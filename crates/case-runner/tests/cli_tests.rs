//! Integration tests for the case-runner CLI.
//!
//! Each test targets a specific feature to ensure failures clearly identify what broke.
//!
//! ## Test Categories
//!
//! ### CLI Arguments
//! - help, version, invalid format, invalid arity
//!
//! ### Extract
//! - files written to disk, strict grouping, missing examples, stdin
//!
//! ### Run
//! - passing and failing suites, missing cases, missing solution, JSON output
//!
//! ### End to end
//! - `test` subcommand on a full problem statement
//!
//! Tests that execute solutions need a POSIX `sh` and only run on unix.

#[path = "cli_tests/args.rs"]
mod args;
#[path = "cli_tests/end_to_end.rs"]
mod end_to_end;
#[path = "cli_tests/extract.rs"]
mod extract;
#[path = "cli_tests/run.rs"]
mod run;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const TWO_SUM: &str = "<p><strong>Example 1:</strong></p>
<pre><strong>Input:</strong> nums = [2,7,11,15], target = 9
<strong>Output:</strong> [0,1]</pre>
<p><strong>Example 2:</strong></p>
<pre><strong>Input:</strong> nums = [3,2,4], target = 6
<strong>Output:</strong> [1,2]</pre>";

pub const TWO_SUM_SOLUTION: &str = r#"read nums
read target
case "$target" in
  "target = 9") echo "[0,1]" ;;
  "target = 6") echo "[1,2]" ;;
  *) echo "unexpected: $target" >&2; exit 1 ;;
esac
"#;

#[must_use]
pub fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_case-runner"))
}

/// Command rooted in `dir`, so the default config and testcases paths resolve there.
#[must_use]
pub fn case_runner(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(binary_path());
    cmd.current_dir(dir).arg("--no-color").env_remove("CASE_RUNNER_LOG");
    cmd
}

/// Write `content` to `name` inside `dir` and return the full path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
}
