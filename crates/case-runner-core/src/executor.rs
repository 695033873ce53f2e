//! Out-of-process execution of a solution against one input.

use crate::language::{CommandTemplate, TemplateVars, Toolchains};
use crate::process::{ProcessError, ProcessSpec, run_captured, truncate_chars};
use crate::types::{ExecutionOutcome, SolutionArtifact};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::time::Duration;

/// Default limit for the compile step.
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum characters kept in a failure detail.
pub const MAX_DETAIL_CHARS: usize = 4000;

fn error_diagnostic_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)\berror(?:\[\w+\])?:").ok())
        .as_ref()
}

/// Whether compiler output contains an error diagnostic (warnings do not count).
#[must_use]
pub fn has_error_diagnostic(output: &str) -> bool {
    error_diagnostic_regex().is_some_and(|re| re.is_match(output))
}

/// Runs solutions through their toolchain recipes.
#[derive(Debug, Clone)]
pub struct Executor {
    toolchains: Toolchains,
    compile_timeout: Duration,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Toolchains::builtin(), DEFAULT_COMPILE_TIMEOUT)
    }
}

impl Executor {
    #[must_use]
    pub const fn new(toolchains: Toolchains, compile_timeout: Duration) -> Self {
        Self {
            toolchains,
            compile_timeout,
        }
    }

    #[must_use]
    pub const fn toolchains(&self) -> &Toolchains {
        &self.toolchains
    }

    /// Compile (if the recipe has a compile step) and run `solution` with
    /// `input` on stdin.
    ///
    /// Every failure is classified into the returned outcome; nothing here is
    /// fatal to the caller.
    pub async fn run(
        &self,
        solution: &SolutionArtifact,
        input: &str,
        deadline: Duration,
    ) -> ExecutionOutcome {
        let Some((tag, runtime)) = self.toolchains.resolve(&solution.language) else {
            tracing::debug!(language = %solution.language, "no toolchain recipe");
            return ExecutionOutcome::UnsupportedLanguage(solution.language.clone());
        };

        let source = match std::path::absolute(&solution.path) {
            Ok(source) => source,
            Err(e) => {
                return ExecutionOutcome::RuntimeFailure(format!(
                    "cannot resolve solution path {}: {e}",
                    solution.path.display()
                ));
            }
        };
        let build = match tempfile::Builder::new().prefix("case-runner-").tempdir() {
            Ok(build) => build,
            Err(e) => {
                return ExecutionOutcome::RuntimeFailure(format!(
                    "failed to create build directory: {e}"
                ));
            }
        };
        let vars = TemplateVars::new(&source, build.path());
        let cwd = solution_dir(&source);

        if let Some(compile) = &runtime.compile {
            tracing::debug!(language = tag, "compiling {}", source.display());
            if let Err(detail) = self.compile(compile, &vars, &cwd).await {
                return ExecutionOutcome::CompileFailure(detail);
            }
        }

        execute(&runtime.run, &vars, &cwd, input, deadline).await
    }

    async fn compile(
        &self,
        template: &CommandTemplate,
        vars: &TemplateVars,
        cwd: &Path,
    ) -> Result<(), String> {
        let Some((program, args)) = template.render(vars) else {
            return Err("compile command is empty".to_string());
        };
        let spec = ProcessSpec {
            program: &program,
            args: &args,
            cwd,
            stdin: None,
            timeout: self.compile_timeout,
        };

        let output = match run_captured(spec).await {
            Ok(output) => output,
            Err(ProcessError::TimedOut { timeout_ms }) => {
                return Err(format!("compile step timed out after {timeout_ms}ms"));
            }
            Err(e) => return Err(e.to_string()),
        };

        let diagnostics = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        if !output.status.success() || has_error_diagnostic(diagnostics) {
            let detail = if diagnostics.is_empty() {
                format!("compiler exited with {}", output.status)
            } else {
                truncate_chars(diagnostics, MAX_DETAIL_CHARS)
            };
            return Err(detail);
        }
        if !diagnostics.is_empty() {
            tracing::debug!("compiler output: {diagnostics}");
        }
        Ok(())
    }
}

async fn execute(
    template: &CommandTemplate,
    vars: &TemplateVars,
    cwd: &Path,
    input: &str,
    deadline: Duration,
) -> ExecutionOutcome {
    let Some((program, args)) = template.render(vars) else {
        return ExecutionOutcome::RuntimeFailure("run command is empty".to_string());
    };
    let spec = ProcessSpec {
        program: &program,
        args: &args,
        cwd,
        stdin: Some(input),
        timeout: deadline,
    };

    match run_captured(spec).await {
        Ok(output) if output.status.success() => {
            ExecutionOutcome::Success(output.stdout.trim().to_string())
        }
        Ok(output) => {
            let stderr = output.stderr.trim();
            let detail = if stderr.is_empty() {
                format!("process exited with {}", output.status)
            } else {
                truncate_chars(stderr, MAX_DETAIL_CHARS)
            };
            ExecutionOutcome::RuntimeFailure(detail)
        }
        Err(ProcessError::TimedOut { timeout_ms }) => ExecutionOutcome::Timeout {
            deadline_ms: timeout_ms,
        },
        Err(e) => ExecutionOutcome::RuntimeFailure(e.to_string()),
    }
}

fn solution_dir(source: &Path) -> PathBuf {
    source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
