//! Child process spawning with captured output and a hard deadline.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::{Duration, Instant};

/// Maximum bytes kept per output stream; the rest is read and discarded.
pub const MAX_CAPTURE_BYTES: usize = 16 * 1024 * 1024;

/// How long to keep draining pipes after the process group is killed.
pub const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Errors that can occur while running a child process.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to run and how.
#[derive(Debug, Clone, Copy)]
pub struct ProcessSpec<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub cwd: &'a Path,
    /// Written to stdin, then stdin is closed. `None` attaches `/dev/null`.
    pub stdin: Option<&'a str>,
    pub timeout: Duration,
}

/// Captured result of a process that finished before its deadline.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run a process to completion, capturing stdout and stderr.
///
/// On Unix the child leads its own process group. The whole group is killed
/// once the leader exits or the deadline passes.
///
/// # Errors
/// Returns an error if:
/// - The program cannot be spawned
/// - The deadline passes before the process exits
/// - Reading the output pipes fails
pub async fn run_captured(spec: ProcessSpec<'_>) -> Result<ProcessOutput, ProcessError> {
    let deadline = Instant::now() + spec.timeout;

    let mut cmd = Command::new(spec.program);
    cmd.args(spec.args)
        .current_dir(spec.cwd)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    tracing::debug!(
        program = spec.program,
        args = ?spec.args,
        cwd = %spec.cwd.display(),
        "spawning"
    );
    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: spec.program.to_string(),
        source,
    })?;
    let pid = child.id();

    if let (Some(mut pipe), Some(input)) = (child.stdin.take(), spec.stdin) {
        let mut data = input.to_string();
        if !data.ends_with('\n') {
            data.push('\n');
        }
        tokio::spawn(async move {
            // A child that exits without reading its input closes the pipe early.
            if let Err(e) = pipe.write_all(data.as_bytes()).await {
                tracing::debug!("stdin write stopped: {e}");
            }
        });
    }

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let mut readers = tokio::spawn(async move {
        tokio::join!(
            read_capped(stdout, MAX_CAPTURE_BYTES),
            read_capped(stderr, MAX_CAPTURE_BYTES)
        )
    });

    let status = match tokio::time::timeout_at(deadline, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            kill_group(pid);
            if let Err(e) = child.kill().await {
                tracing::debug!("kill after timeout: {e}");
            }
            readers.abort();
            return Err(ProcessError::TimedOut {
                timeout_ms: u64::try_from(spec.timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
    };

    // Descendants left behind by the leader must not outlive this invocation.
    kill_group(pid);
    let Ok(joined) = tokio::time::timeout(PIPE_DRAIN_GRACE, &mut readers).await else {
        readers.abort();
        return Err(ProcessError::Io(std::io::Error::other(
            "output pipes held open by a process outside the group",
        )));
    };
    let (stdout, stderr) = joined.map_err(std::io::Error::other)?;

    Ok(ProcessOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout?).into_owned(),
        stderr: String::from_utf8_lossy(&stderr?).into_owned(),
    })
}

/// Read a stream to EOF, keeping at most `limit` bytes.
async fn read_capped<R>(reader: Option<R>, limit: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..n.min(room)]);
    }
    Ok(buf)
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    // ESRCH just means the group is already gone.
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        tracing::debug!(pid, "killpg: {e}");
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

/// Truncate to at most `max_chars` characters, marking the cut.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...[truncated]", &s[..cut]),
        None => s.to_string(),
    }
}
