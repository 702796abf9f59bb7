//! Subprocess execution for vendor diagnostic tools.
//!
//! Every external process spawned by the agent goes through [`CommandRunner`], which keeps
//! probing and source adapters independent of real binaries in tests.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::trace;

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human readable description of a failed run for error messages
    pub fn failure_reason(&self) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = String::from_utf8_lossy(&self.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit
    ///
    /// Returns `Err` only when the process could not be launched or did not finish in time;
    /// a non-zero exit is reported through [`ToolOutput::exit_code`].
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput>;
}

/// Runs real processes with a bounded wait
///
/// Children are spawned with `kill_on_drop`, so a child is killed both when the timeout
/// expires and when the request awaiting it is dropped.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput> {
        trace!(program, ?args, "spawning process");

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let output = timeout(self.timeout, command.output()).await.map_err(|_| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{} did not exit within {:.2?}", program, self.timeout),
            )
        })??;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_includes_stderr() {
        let output = ToolOutput {
            exit_code: Some(9),
            stdout: Vec::new(),
            stderr: b"  NVIDIA-SMI has failed\n".to_vec(),
        };
        assert!(!output.success());
        assert_eq!(output.failure_reason(), "exited with status 9: NVIDIA-SMI has failed");
    }

    #[test]
    fn test_failure_reason_without_stderr() {
        let output = ToolOutput {
            exit_code: None,
            ..Default::default()
        };
        assert_eq!(output.failure_reason(), "terminated by signal");
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let result = runner
            .run("gpustat-definitely-not-a-real-binary", &[])
            .await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_process_times_out() {
        let runner = ProcessRunner::new(Duration::from_millis(200));
        let started = std::time::Instant::now();

        let error = runner.run("sleep", &["5"]).await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::TimedOut);
        assert!(error.to_string().starts_with("sleep did not exit within"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let output = runner.run("sh", &["-c", "echo oops >&2; exit 3"]).await.unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.failure_reason(), "exited with status 3: oops");
    }
}
