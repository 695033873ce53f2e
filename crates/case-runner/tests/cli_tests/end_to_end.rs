//! `test` subcommand: extract, persist and run in one step.

use super::{TWO_SUM, TWO_SUM_SOLUTION, TestResult, case_runner, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

#[cfg(unix)]
#[test]
fn test_two_sum_end_to_end() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "two-sum.html", TWO_SUM)?;
    write_file(&dir, "two_sum.sh", TWO_SUM_SOLUTION)?;

    case_runner(dir.path())
        .args(["test", "two-sum.html", "two_sum.sh"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("test result: ok. 2 passed"));

    assert!(dir.path().join("testcases/input_1.txt").is_file());
    assert!(dir.path().join("testcases/output_2.txt").is_file());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_end_to_end_then_rerun_stored_suite() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "two-sum.html", TWO_SUM)?;
    write_file(&dir, "two_sum.sh", TWO_SUM_SOLUTION)?;

    case_runner(dir.path())
        .args(["test", "two-sum.html", "two_sum.sh", "--out", "suite"])
        .assert()
        .code(0);

    case_runner(dir.path())
        .args(["run", "two_sum.sh", "--cases", "suite"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("2 passed"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_end_to_end_failing_solution() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "two-sum.html", TWO_SUM)?;
    write_file(&dir, "wrong.sh", "read nums\nread target\necho \"[0,1]\"\n")?;

    case_runner(dir.path())
        .args(["test", "two-sum.html", "wrong.sh", "--format", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"failed\": 1"));
    Ok(())
}

#[test]
fn test_end_to_end_without_examples() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "empty.md", "# Problem\n\nNo examples.\n")?;
    write_file(&dir, "solution.sh", "echo 1\n")?;

    case_runner(dir.path())
        .args(["test", "empty.md", "solution.sh"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no examples found"));
    Ok(())
}
