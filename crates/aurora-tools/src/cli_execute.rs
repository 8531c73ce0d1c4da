//! The `cli_execute` Action kind: run a subprocess and capture its exit.
//!
//! Grounded on the teacher's bash-tool idiom (`tokio::process::Command`,
//! timeout-wrapped, stdout/stderr captured separately) but stripped of
//! the persistent-cwd-across-calls bookkeeping a chat coding tool needs
//! — each `cli_execute` Action is a single self-contained subprocess run.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{ToolsError, ToolsResult};

/// Default timeout in seconds when an Action omits `timeout_sec`.
pub const DEFAULT_TIMEOUT_SEC: u64 = 120;
/// Maximum timeout in seconds regardless of what the Action requests.
pub const MAX_TIMEOUT_SEC: u64 = 600;

/// The result of one `cli_execute` Action.
#[derive(Debug, Clone)]
pub struct CliExecuteResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Process exit code, or `-1` if the process was killed by a signal.
    pub returncode: i32,
}

/// Run `command` through `bash -c`, enforcing a wall-clock deadline.
///
/// On timeout the child process is killed and [`ToolsError::Timeout`] is
/// returned; the Action Executor maps this to the `timeout` status.
pub async fn run_cli_execute(
    command: &str,
    timeout_sec: u64,
    cwd: Option<&Path>,
) -> ToolsResult<CliExecuteResult> {
    let timeout = Duration::from_secs(timeout_sec.clamp(1, MAX_TIMEOUT_SEC));

    let mut builder = Command::new("bash");
    builder.arg("-c").arg(command).kill_on_drop(true);
    if let Some(cwd) = cwd {
        builder.current_dir(cwd);
    }

    match tokio::time::timeout(timeout, builder.output()).await {
        Ok(Ok(output)) => Ok(CliExecuteResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            returncode: output.status.code().unwrap_or(-1),
        }),
        Ok(Err(source)) => Err(ToolsError::Io(source)),
        #[allow(clippy::cast_possible_truncation)]
        Err(_elapsed) => Err(ToolsError::Timeout { elapsed_ms: timeout.as_millis() as u64 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let result = run_cli_execute("echo hello && exit 0", 5, None).await.unwrap();
        assert!(result.stdout.contains("hello"));
        assert_eq!(result.returncode, 0);
    }

    #[tokio::test]
    async fn captures_nonzero_exit() {
        let result = run_cli_execute("exit 7", 5, None).await.unwrap();
        assert_eq!(result.returncode, 7);
    }

    #[tokio::test]
    async fn captures_stderr() {
        let result = run_cli_execute("echo oops >&2", 5, None).await.unwrap();
        assert!(result.stderr.contains("oops"));
    }

    #[tokio::test]
    async fn times_out_long_running_commands() {
        let result = run_cli_execute("sleep 5", 1, None).await;
        assert!(matches!(result, Err(ToolsError::Timeout { .. })));
    }

    #[tokio::test]
    async fn runs_in_the_requested_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_cli_execute("pwd", 5, Some(dir.path())).await.unwrap();
        assert!(result.stdout.trim().ends_with(dir.path().file_name().unwrap().to_str().unwrap()));
    }

    #[tokio::test]
    async fn kills_the_child_process_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let command = format!("echo $$ > {} && sleep 30", pid_file.display());

        let result = run_cli_execute(&command, 1, None).await;
        assert!(matches!(result, Err(ToolsError::Timeout { .. })));

        // kill_on_drop's SIGKILL is delivered async to the dropped child;
        // give the kernel a moment to reap it before checking.
        tokio::time::sleep(Duration::from_millis(300)).await;

        let pid_text = tokio::fs::read_to_string(&pid_file).await.unwrap();
        let pid: i32 = pid_text.trim().parse().unwrap();
        assert!(
            !Path::new(&format!("/proc/{pid}")).exists(),
            "child process {pid} should have been killed when the timeout elapsed"
        );
    }
}
