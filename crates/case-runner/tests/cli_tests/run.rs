//! `run` subcommand tests.

use super::{TestResult, case_runner, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

/// A stored suite of squares: `n = 2` -> 4 and `n = 3` -> 9.
fn squares_suite(dir: &TempDir) -> std::io::Result<()> {
    write_file(dir, "testcases/input_1.txt", "n = 2\n")?;
    write_file(dir, "testcases/output_1.txt", "4\n")?;
    write_file(dir, "testcases/input_2.txt", "n = 3\n")?;
    write_file(dir, "testcases/output_2.txt", "9\n")?;
    Ok(())
}

const SQUARES_SOLUTION: &str = "read line\nn=${line#n = }\necho $((n * n))\n";

#[cfg(unix)]
#[test]
fn test_run_all_pass() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;
    write_file(&dir, "square.sh", SQUARES_SOLUTION)?;

    case_runner(dir.path())
        .args(["run", "square.sh"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("running 2 test cases against square.sh"))
        .stdout(predicate::str::contains("test case 1 ... ok"))
        .stdout(predicate::str::contains("test case 2 ... ok"))
        .stdout(predicate::str::contains(
            "test result: ok. 2 passed; 0 failed; 0 errored",
        ));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_wrong_answer() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;
    write_file(&dir, "double.sh", "read line\nn=${line#n = }\necho $((n + n))\n")?;

    case_runner(dir.path())
        .args(["run", "double.sh"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("test case 1 ... ok"))
        .stdout(predicate::str::contains("test case 2 ... FAILED"))
        .stdout(predicate::str::contains("6"))
        .stdout(predicate::str::contains(
            "test result: FAILED. 1 passed; 1 failed; 0 errored",
        ));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_runtime_error() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;
    write_file(&dir, "crash.sh", "echo boom >&2\nexit 3\n")?;

    case_runner(dir.path())
        .args(["run", "crash.sh"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR (runtime error)"))
        .stdout(predicate::str::contains("boom"))
        .stdout(predicate::str::contains("0 passed; 0 failed; 2 errored"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_timeout() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "testcases/input_1.txt", "n = 1\n")?;
    write_file(&dir, "testcases/output_1.txt", "1\n")?;
    write_file(&dir, "slow.sh", "sleep 10\necho 1\n")?;

    case_runner(dir.path())
        .args(["run", "slow.sh", "--timeout", "200"])
        .timeout(std::time::Duration::from_secs(8))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR (timeout)"));
    Ok(())
}

#[test]
fn test_run_unsupported_language() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;
    write_file(&dir, "solution.cobol", "DISPLAY 4.\n")?;

    case_runner(dir.path())
        .args(["run", "solution.cobol"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR (unsupported language)"))
        .stderr(predicate::str::contains("no toolchain for language 'cobol'"));
    Ok(())
}

#[test]
fn test_run_missing_cases() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "square.sh", SQUARES_SOLUTION)?;

    case_runner(dir.path())
        .args(["run", "square.sh"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to load test cases"));
    Ok(())
}

#[test]
fn test_run_missing_solution() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;

    case_runner(dir.path())
        .args(["run", "missing.sh"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Solution file not found"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_json_output() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;
    write_file(&dir, "square.sh", SQUARES_SOLUTION)?;

    let output = case_runner(dir.path())
        .args(["run", "square.sh", "--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["language"], "shell");
    assert_eq!(value["summary"]["total"], 2);
    assert_eq!(value["summary"]["passed"], 2);
    assert_eq!(value["verdicts"][1]["index"], 2);
    assert_eq!(value["verdicts"][1]["actual"], "9");
    assert!(value["generated_at"].is_string());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_legacy_json_cases() -> TestResult {
    let dir = TempDir::new()?;
    write_file(
        &dir,
        "testcases.json",
        r#"[{"input": "n = 4", "output": "16"}, {"input": "n = 5", "output": "25"}]"#,
    )?;
    write_file(&dir, "square.sh", SQUARES_SOLUTION)?;

    case_runner(dir.path())
        .args(["run", "square.sh", "--cases", "testcases.json"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("2 passed"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_explicit_language() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;
    write_file(&dir, "square.txt", SQUARES_SOLUTION)?;

    case_runner(dir.path())
        .args(["run", "square.txt", "--lang", "sh"])
        .assert()
        .code(0);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_verbose_shows_progress() -> TestResult {
    let dir = TempDir::new()?;
    squares_suite(&dir)?;
    write_file(&dir, "square.sh", SQUARES_SOLUTION)?;

    case_runner(dir.path())
        .args(["run", "square.sh", "--verbose"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("[2/2]"))
        .stdout(predicate::str::contains("input:"));
    Ok(())
}
