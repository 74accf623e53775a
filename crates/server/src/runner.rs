//! External tool runner
//!
//! Spawns the media tool for an [`Invocation`] and turns its exit status and
//! output streams into result text according to the configured [`ExitPolicy`].

use crate::config::ExitPolicy;
use crate::invocation::Invocation;
use std::future::Future;
use std::process::Stdio;
use thiserror::Error;

/// Error type for tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be started at all
    #[error("{tool} error: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully without usable output
    #[error("{tool} error: {}", describe_failure(.code, .stderr))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_failure(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    };
    if stderr.trim().is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr.trim())
    }
}

/// Captured result of a finished tool process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes invocations. The production implementation spawns a process;
/// tests substitute a recorder.
pub trait ToolRunner: Send + Sync {
    fn run(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<ToolOutput, ToolError>> + Send;
}

/// Runs invocations as child processes and waits for them to exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                tool: invocation.program.clone(),
                source,
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Pick the text returned to the caller from a finished process.
///
/// On success this is stdout, or stderr when stdout is empty (ffmpeg logs
/// everything to stderr). On failure, [`ExitPolicy::Lenient`] still returns
/// stderr when there is any; [`ExitPolicy::Strict`] always fails.
pub fn resolve_output(
    tool: &str,
    output: ToolOutput,
    policy: ExitPolicy,
) -> Result<String, ToolError> {
    if output.succeeded() {
        return Ok(if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        });
    }

    match policy {
        ExitPolicy::Lenient if !output.stderr.is_empty() => Ok(output.stderr),
        _ => Err(ToolError::Failed {
            tool: tool.to_string(),
            code: output.code,
            stderr: output.stderr,
        }),
    }
}
