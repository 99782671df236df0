//! External command execution
//!
//! Every cluster interaction (helm, kubectl) goes through a [`CommandRunner`].
//! Commands run with a fixed argument vector and never through a shell, so
//! caller-supplied values cannot be reinterpreted.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Failure of a single external command
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started at all
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited with a nonzero status. Displays stderr verbatim.
    #[error("{}", failure_text(.program, .code, .stderr))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The program did not finish within the configured bound
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

fn failure_text(program: &str, code: &Option<i32>, stderr: &str) -> String {
    if !stderr.trim().is_empty() {
        return stderr.to_string();
    }
    match code {
        Some(code) => format!("{} exited with status {}", program, code),
        None => format!("{} was terminated by a signal", program),
    }
}

/// Executes external programs and captures their output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`. Returns stdout when the exit status is zero,
    /// otherwise the stderr text as [`CommandError::Failed`].
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}

/// Runs commands as child processes of the daemon
#[derive(Debug, Clone)]
pub struct ProcessCommandRunner {
    timeout: Duration,
}

impl ProcessCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessCommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(120))
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    #[instrument(skip(self, args), fields(args = args.len()))]
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(CommandError::TimedOut {
                    program: program.to_string(),
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            debug!(code = ?output.status.code(), "Command failed");
            return Err(CommandError::Failed {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Convenience for building argument vectors from string literals
pub(crate) fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
