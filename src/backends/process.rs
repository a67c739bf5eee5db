//! Spawning external tools with a timeout.

use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

/// Result of a process that ran to completion.
#[derive(Debug)]
pub(crate) struct Finished {
    pub status: ExitStatus,
    pub stderr: String,
}

impl Finished {
    /// Exit code, or -1 when terminated by a signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }

    /// Short description for error messages.
    pub fn describe(&self, program: &Path) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("{} exited with status {}", program.display(), self.code())
        } else {
            format!(
                "{} exited with status {}: {}",
                program.display(),
                self.code(),
                stderr
            )
        }
    }
}

#[derive(Debug)]
pub(crate) enum Failure {
    Spawn(std::io::Error),
    Timeout,
}

/// Run `program` with `args`, killing it if it outlives `timeout_secs`.
pub(crate) async fn run(
    program: &Path,
    args: &[OsString],
    timeout_secs: u64,
) -> Result<Finished, Failure> {
    debug!("Running {} {:?}", program.display(), args);
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = timeout(Duration::from_secs(timeout_secs), command.output())
        .await
        .map_err(|_| Failure::Timeout)?
        .map_err(Failure::Spawn)?;

    Ok(Finished {
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_exit_status() {
        let finished = run(Path::new("sh"), &["-c".into(), "exit 3".into()], 5)
            .await
            .expect("sh should run");
        assert_eq!(finished.code(), 3);
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let result = run(Path::new("/definitely/not/a/binary"), &[], 5).await;
        assert!(matches!(result, Err(Failure::Spawn(_))));
    }

    #[tokio::test]
    async fn slow_program_times_out() {
        let result = run(Path::new("sleep"), &["5".into()], 1).await;
        assert!(matches!(result, Err(Failure::Timeout)));
    }
}
