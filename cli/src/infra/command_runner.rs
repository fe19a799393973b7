//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::cancel::CancelToken;
use crate::application::ports::CommandRunner;
use crate::domain::RunError;

/// Default timeout for commands run without an explicit override.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Production `CommandRunner` that uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// On Windows, `tokio::time::timeout` around `.output().await` does NOT kill
/// the child process when the timeout fires: the future is dropped but the
/// OS process keeps running. This implementation uses `tokio::select!` with
/// explicit `child.kill()` to guarantee the process is terminated.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output, RunError> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_cancellable(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<Output, RunError> {
        tracing::debug!(program, ?args, timeout_secs = timeout.as_secs(), "spawning");

        // stdin is closed so nothing on the far side can wait for input.
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        // Read stdout/stderr CONCURRENTLY with wait() to avoid pipe deadlock.
        // If the child writes more than the OS pipe buffer, it blocks on
        // write and wait() never resolves.
        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    read_all(stdout_handle.as_mut()),
                    read_all(stderr_handle.as_mut()),
                );
                let status = status.map_err(|source| RunError::Wait {
                    program: program.to_string(),
                    source,
                })?;
                // A short read must not pass for complete output.
                let stdout = stdout.map_err(|source| RunError::Read {
                    program: program.to_string(),
                    stream: "stdout",
                    source,
                })?;
                let stderr = stderr.map_err(|source| RunError::Read {
                    program: program.to_string(),
                    stream: "stderr",
                    source,
                })?;
                tracing::debug!(program, code = ?status.code(), "process exited");
                Ok(Output { status, stdout, stderr })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                tracing::warn!(program, timeout_secs = timeout.as_secs(), "process timed out, killed");
                Err(RunError::TimedOut { program: program.to_string(), timeout })
            }
            () = cancel.cancelled() => {
                let _ = child.kill().await;
                tracing::warn!(program, "process cancelled, killed");
                Err(RunError::Cancelled { program: program.to_string() })
            }
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(handle: Option<&mut R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(h) = handle {
        h.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
