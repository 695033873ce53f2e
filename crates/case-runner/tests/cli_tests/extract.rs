//! `extract` subcommand tests.

use super::{TWO_SUM, TestResult, case_runner, write_file};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_extract_writes_case_files() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "problem.html", TWO_SUM)?;

    case_runner(dir.path())
        .args(["extract", "problem.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("input_1.txt"))
        .stdout(predicate::str::contains("output_2.txt"))
        .stdout(predicate::str::contains("extracted 2 test cases (arity 2)"));

    let cases = dir.path().join("testcases");
    assert_eq!(
        fs::read_to_string(cases.join("input_1.txt"))?,
        "nums = [2,7,11,15]\ntarget = 9\n"
    );
    assert_eq!(fs::read_to_string(cases.join("output_1.txt"))?, "[0,1]\n");
    assert_eq!(
        fs::read_to_string(cases.join("input_2.txt"))?,
        "nums = [3,2,4]\ntarget = 6\n"
    );
    assert_eq!(fs::read_to_string(cases.join("output_2.txt"))?, "[1,2]\n");
    Ok(())
}

#[test]
fn test_extract_to_custom_dir() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "problem.html", TWO_SUM)?;

    case_runner(dir.path())
        .args(["extract", "problem.html", "--out", "cases/two-sum"])
        .assert()
        .success();

    assert!(dir.path().join("cases/two-sum/input_2.txt").is_file());
    assert!(!dir.path().join("testcases").exists());
    Ok(())
}

#[test]
fn test_extract_dir_from_config() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "problem.html", TWO_SUM)?;
    write_file(&dir, "case-runner.config.yaml", "testcases-dir: suite\n")?;

    case_runner(dir.path())
        .args(["extract", "problem.html"])
        .assert()
        .success();

    assert!(dir.path().join("suite/output_1.txt").is_file());
    Ok(())
}

#[test]
fn test_extract_from_stdin() -> TestResult {
    let dir = TempDir::new()?;

    case_runner(dir.path())
        .args(["extract", "-"])
        .write_stdin("Input: s = \"abc\"\nOutput: 3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("extracted 1 test case (arity 1)"));

    assert_eq!(
        fs::read_to_string(dir.path().join("testcases/input_1.txt"))?,
        "s = abc\n"
    );
    Ok(())
}

#[test]
fn test_extract_without_examples() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "problem.md", "Just a description, no examples.")?;

    case_runner(dir.path())
        .args(["extract", "problem.md"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no examples found"));

    assert!(!dir.path().join("testcases").exists());
    Ok(())
}

#[test]
fn test_extract_missing_content_file() -> TestResult {
    let dir = TempDir::new()?;

    case_runner(dir.path())
        .args(["extract", "missing.md"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to read"));
    Ok(())
}

#[test]
fn test_extract_incomplete_group_dropped_with_warning() -> TestResult {
    let dir = TempDir::new()?;
    write_file(
        &dir,
        "problem.md",
        "Input: a = 1, b = 2\nOutput: 3\nInput: a = 4\nOutput: 4\n",
    )?;

    case_runner(dir.path())
        .args(["extract", "problem.md"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning"))
        .stdout(predicate::str::contains("extracted 1 test case (arity 2)"));
    Ok(())
}

#[test]
fn test_extract_strict_rejects_incomplete_group() -> TestResult {
    let dir = TempDir::new()?;
    write_file(
        &dir,
        "problem.md",
        "Input: a = 1, b = 2\nOutput: 3\nInput: a = 4\nOutput: 4\n",
    )?;

    case_runner(dir.path())
        .args(["extract", "problem.md", "--strict"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("grouping failed"));

    assert!(!dir.path().join("testcases").exists());
    Ok(())
}

#[test]
fn test_extract_arity_override() -> TestResult {
    let dir = TempDir::new()?;
    write_file(
        &dir,
        "problem.md",
        "Input: a = 1, b = 2\nOutput: 1\nInput: a = 3, b = 4\nOutput: 3\n",
    )?;

    case_runner(dir.path())
        .args(["extract", "problem.md", "--arity", "4"])
        .assert()
        .success()
        .stderr(predicate::str::contains("dropped 1 output value(s)"))
        .stdout(predicate::str::contains("extracted 1 test case (arity 4)"));

    assert_eq!(
        fs::read_to_string(dir.path().join("testcases/input_1.txt"))?,
        "a = 1\nb = 2\na = 3\nb = 4\n"
    );
    assert!(!dir.path().join("testcases/input_2.txt").exists());
    Ok(())
}

#[test]
fn test_extract_replaces_stale_cases() -> TestResult {
    let dir = TempDir::new()?;
    write_file(&dir, "problem.html", TWO_SUM)?;
    write_file(&dir, "testcases/input_3.txt", "old\n")?;
    write_file(&dir, "testcases/output_3.txt", "old\n")?;

    case_runner(dir.path())
        .args(["extract", "problem.html"])
        .assert()
        .success();

    assert!(!dir.path().join("testcases/input_3.txt").exists());
    assert!(!dir.path().join("testcases/output_3.txt").exists());
    Ok(())
}
