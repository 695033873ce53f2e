//! CLI argument tests.

use super::{TestResult, case_runner};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_arg_help() -> TestResult {
    let dir = TempDir::new()?;
    case_runner(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Turn problem statements into test suites"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("test"));
    Ok(())
}

#[test]
fn test_arg_version() -> TestResult {
    let dir = TempDir::new()?;
    case_runner(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("case-runner"));
    Ok(())
}

#[test]
fn test_arg_missing_subcommand() -> TestResult {
    let dir = TempDir::new()?;
    case_runner(dir.path()).assert().failure();
    Ok(())
}

#[test]
fn test_arg_invalid_format() -> TestResult {
    let dir = TempDir::new()?;
    std::fs::create_dir(dir.path().join("testcases"))?;
    std::fs::write(dir.path().join("testcases/input_1.txt"), "n = 1\n")?;
    std::fs::write(dir.path().join("testcases/output_1.txt"), "1\n")?;
    std::fs::write(dir.path().join("sol.sh"), "echo 1\n")?;

    case_runner(dir.path())
        .args(["run", "sol.sh", "--format", "invalid"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid format"));
    Ok(())
}

#[test]
fn test_arg_zero_arity() -> TestResult {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("problem.md"), "Input: n = 1\nOutput: 1\n")?;

    case_runner(dir.path())
        .args(["extract", "problem.md", "--arity", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("arity must be at least 1"));
    Ok(())
}

#[test]
fn test_arg_zero_timeout() -> TestResult {
    let dir = TempDir::new()?;
    case_runner(dir.path())
        .args(["run", "sol.sh", "--timeout", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("timeout-ms must be greater than zero"));
    Ok(())
}

#[test]
fn test_arg_invalid_config() -> TestResult {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("case-runner.config.yaml"), "unknown-key: 1\n")?;

    case_runner(dir.path())
        .args(["extract", "problem.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid config"));
    Ok(())
}
