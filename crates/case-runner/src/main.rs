//! case-runner CLI - turn problem statements into test suites and judge solutions.

use case_runner_core::{
    CONFIG_FILE_NAME, CaseRunnerConfig, ConfigOverrides, Executor, GroupedTestCase,
    IncompletePolicy, PreparedSuite, ProgressEvent, ReportFormat, Reporter, ReporterConfig,
    RunReport, RunSummary, SolutionArtifact, apply_overrides, format_json, load_any, load_config,
    prepare_suite, run_suite,
};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read, Stderr, Stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Exit codes for the CLI.
mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const CASES_FAILED: u8 = 1;
    pub const CONFIG_ERROR: u8 = 2;
    pub const PREPARE_ERROR: u8 = 3;
}

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CASE_RUNNER_LOG";

type StdReporter = Reporter<Stdout, Stderr>;

#[derive(Parser)]
#[command(name = "case-runner")]
#[command(about = "Turn problem statements into test suites and judge solutions against them")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, value_name = "PATH", default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract test cases from a problem statement and write them to disk
    Extract {
        /// Problem statement file ("-" for stdin)
        #[arg(value_name = "CONTENT")]
        content: PathBuf,

        /// Output directory (overrides config testcases-dir)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        #[command(flatten)]
        grouping: GroupingArgs,
    },
    /// Run a solution against a stored suite
    Run {
        /// Solution source file
        #[arg(value_name = "SOLUTION")]
        solution: PathBuf,

        /// Test case directory or testcases.json (default: config testcases-dir)
        #[arg(long, value_name = "PATH")]
        cases: Option<PathBuf>,

        #[command(flatten)]
        exec: ExecArgs,
    },
    /// Extract, persist and run in one step
    Test {
        /// Problem statement file ("-" for stdin)
        #[arg(value_name = "CONTENT")]
        content: PathBuf,

        /// Solution source file
        #[arg(value_name = "SOLUTION")]
        solution: PathBuf,

        /// Output directory (overrides config testcases-dir)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        #[command(flatten)]
        grouping: GroupingArgs,

        #[command(flatten)]
        exec: ExecArgs,
    },
}

#[derive(Args)]
struct GroupingArgs {
    /// Number of input arguments per test case (default: detected)
    #[arg(long, value_name = "N")]
    arity: Option<usize>,

    /// Fail instead of dropping input fragments that do not fill a test case
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct ExecArgs {
    /// Language tag (default: inferred from the solution extension)
    #[arg(long, value_name = "TAG")]
    lang: Option<String>,

    /// Per-case timeout in milliseconds (overrides config)
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Output format: table, json
    #[arg(long, default_value = "table")]
    format: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run_command(&cli).await
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .try_init()
        .ok();
}

fn fail(reporter: &mut StdReporter, code: u8, message: &str) -> ExitCode {
    let _ = reporter.error(message);
    ExitCode::from(code)
}

async fn run_command(cli: &Cli) -> ExitCode {
    let mut reporter = Reporter::stdio(ReporterConfig {
        verbose: cli.verbose,
        color: !cli.no_color,
    });

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            return fail(
                &mut reporter,
                exit_code::CONFIG_ERROR,
                &format!("Invalid config {}: {e}", cli.config.display()),
            );
        }
    };

    let overrides = overrides_for(&cli.command);
    let config = match apply_overrides(config, &overrides) {
        Ok(config) => config,
        Err(e) => return fail(&mut reporter, exit_code::CONFIG_ERROR, &e.to_string()),
    };
    tracing::debug!(
        timeout_ms = config.timeout_ms,
        testcases_dir = %config.testcases_dir.display(),
        "effective configuration"
    );

    match &cli.command {
        Command::Extract { content, .. } => extract_command(&mut reporter, &config, content),
        Command::Run {
            solution,
            cases,
            exec,
        } => {
            let path = cases.as_deref().unwrap_or(&config.testcases_dir);
            let cases = match load_any(path) {
                Ok(cases) => cases,
                Err(e) => {
                    return fail(
                        &mut reporter,
                        exit_code::PREPARE_ERROR,
                        &format!("Failed to load test cases: {e}"),
                    );
                }
            };
            run_cases(&mut reporter, &config, solution, exec, &cases).await
        }
        Command::Test {
            content,
            solution,
            exec,
            ..
        } => {
            let Some(suite) = prepare_cases(&mut reporter, &config, content) else {
                return ExitCode::from(exit_code::PREPARE_ERROR);
            };
            run_cases(&mut reporter, &config, solution, exec, &suite.grouping.cases).await
        }
    }
}

fn overrides_for(command: &Command) -> ConfigOverrides {
    let (out, grouping, exec) = match command {
        Command::Extract { out, grouping, .. } => (out.clone(), Some(grouping), None),
        Command::Run { exec, .. } => (None, None, Some(exec)),
        Command::Test {
            out,
            grouping,
            exec,
            ..
        } => (out.clone(), Some(grouping), Some(exec)),
    };
    ConfigOverrides {
        timeout_ms: exec.and_then(|e| e.timeout),
        testcases_dir: out,
        arity: grouping.and_then(|g| g.arity),
        on_incomplete: grouping
            .filter(|g| g.strict)
            .map(|_| IncompletePolicy::Fail),
        ..Default::default()
    }
}

fn read_content(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Extract, group and persist; prints diagnostics. `None` on failure.
fn prepare_cases(
    reporter: &mut StdReporter,
    config: &CaseRunnerConfig,
    content_path: &Path,
) -> Option<PreparedSuite> {
    let content = match read_content(content_path) {
        Ok(content) => content,
        Err(e) => {
            let _ = reporter.error(&format!(
                "Failed to read {}: {e}",
                content_path.display()
            ));
            return None;
        }
    };

    match prepare_suite(&content, &config.testcases_dir, &config.grouping_options()) {
        Ok(suite) => {
            for diagnostic in &suite.grouping.diagnostics {
                let _ = reporter.warn(&diagnostic.to_string());
            }
            Some(suite)
        }
        Err(e) => {
            let _ = reporter.error(&e.to_string());
            None
        }
    }
}

fn extract_command(
    reporter: &mut StdReporter,
    config: &CaseRunnerConfig,
    content_path: &Path,
) -> ExitCode {
    let Some(suite) = prepare_cases(reporter, config, content_path) else {
        return ExitCode::from(exit_code::PREPARE_ERROR);
    };

    for path in &suite.written {
        let _ = reporter.line(&path.display().to_string());
    }
    let count = suite.grouping.cases.len();
    let noun = if count == 1 { "case" } else { "cases" };
    let _ = reporter.line(&format!(
        "extracted {count} test {noun} (arity {}) into {}",
        suite.grouping.arity,
        suite.dir.display()
    ));
    ExitCode::from(exit_code::SUCCESS)
}

async fn run_cases(
    reporter: &mut StdReporter,
    config: &CaseRunnerConfig,
    solution_path: &Path,
    exec: &ExecArgs,
    cases: &[GroupedTestCase],
) -> ExitCode {
    let report_format: ReportFormat = match exec.format.parse() {
        Ok(f) => f,
        Err(e) => {
            return fail(
                reporter,
                exit_code::CONFIG_ERROR,
                &format!("Invalid format: {e}"),
            );
        }
    };

    if !solution_path.is_file() {
        return fail(
            reporter,
            exit_code::CONFIG_ERROR,
            &format!("Solution file not found: {}", solution_path.display()),
        );
    }

    let executor = Executor::new(config.toolchains(), config.compile_timeout());
    let language = exec.lang.clone().unwrap_or_else(|| {
        executor
            .toolchains()
            .tag_for_path(solution_path)
            .map(ToString::to_string)
            .or_else(|| {
                solution_path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
            })
            .unwrap_or_default()
    });
    tracing::debug!(%language, cases = cases.len(), "running suite");
    if executor.toolchains().resolve(&language).is_none() {
        let known: Vec<&str> = executor.toolchains().tags().collect();
        let _ = reporter.warn(&format!(
            "no toolchain for language '{language}' (known: {}); every case will error",
            known.join(", ")
        ));
    }
    let solution = SolutionArtifact::new(solution_path, language.clone());
    let show_progress = report_format == ReportFormat::Table;

    if show_progress {
        let _ = reporter.suite_start(cases.len(), &solution_path.display().to_string());
    }

    // Verbose progress goes to stderr while the run is in flight.
    let (progress_tx, progress_handle) = if show_progress && reporter.config().verbose {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
        let mut progress_reporter = Reporter::stdio(*reporter.config());
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let ProgressEvent::CaseCompleted {
                    index,
                    total,
                    verdict,
                } = event
                {
                    let _ = progress_reporter.progress(index, total, verdict.status);
                }
            }
        });
        (Some(tx), Some(handle))
    } else {
        (None, None)
    };

    let start_time = Instant::now();
    let verdicts = run_suite(
        &executor,
        &solution,
        cases,
        config.deadline(),
        progress_tx.as_ref(),
    )
    .await;
    drop(progress_tx);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let all_passed = match report_format {
        ReportFormat::Table => {
            let _ = reporter.report(&verdicts, Some(start_time.elapsed()));
            RunSummary::from_verdicts(&verdicts).all_passed()
        }
        ReportFormat::Json => {
            let report = RunReport::new(
                &solution_path.display().to_string(),
                &language,
                verdicts,
            );
            let _ = reporter.line(&format_json(&report));
            report.summary.all_passed()
        }
    };

    if all_passed {
        ExitCode::from(exit_code::SUCCESS)
    } else {
        ExitCode::from(exit_code::CASES_FAILED)
    }
}
