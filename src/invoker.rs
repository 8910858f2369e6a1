//! One bounded execution of an external program.
//!
//! [`run`] spawns the program, captures stdout/stderr, and enforces a
//! wall-clock deadline. The child never outlives the call: on timeout the
//! future holding it is dropped and `kill_on_drop` reaps it, and the same
//! holds if the caller cancels mid-invocation.

use std::process::Stdio;
use std::time::Duration;

use log::debug;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::Error;

/// Outcome of one process invocation that ran to completion.
///
/// Never partially populated: `succeeded == false` implies `error` is set.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub succeeded: bool,
    pub output: String,
    pub error: Option<String>,
}

/// Run `argv` with the given deadline, blocking the calling task until the
/// process exits or the deadline elapses.
///
/// Exit 0 yields a succeeded result with stdout; non-zero exit yields a
/// failed result with stdout plus stderr (or a synthesized message when
/// stderr is empty). A process that cannot be started raises
/// [`Error::InvocationFailed`]; a deadline overrun raises
/// [`Error::TimedOut`] — a `CommandResult` is never returned in either case.
pub async fn run(argv: &[String], deadline: Duration) -> Result<CommandResult, Error> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::InvocationFailed("empty argv".into()))?;

    debug!("invoking: {} (deadline {:?})", argv.join(" "), deadline);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| Error::InvocationFailed(format!("failed to start {}: {}", program, e)))?;

    // Dropping the wait future on timeout kills the child via kill_on_drop.
    let output = match timeout(deadline, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(Error::InvocationFailed(format!(
                "failed waiting for {}: {}",
                program, e
            )));
        }
        Err(_) => {
            return Err(Error::TimedOut {
                seconds: deadline.as_secs_f64(),
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if output.status.success() {
        Ok(CommandResult {
            succeeded: true,
            output: stdout,
            error: None,
        })
    } else {
        let error = if stderr.trim().is_empty() {
            format!(
                "command failed with exit code {}",
                output.status.code().unwrap_or(-1)
            )
        } else {
            stderr
        };
        Ok(CommandResult {
            succeeded: false,
            output: stdout,
            error: Some(error),
        })
    }
}
