//! Operation dispatch
//!
//! Routes a named call to its command builder, runs the resulting
//! invocation and renders the outcome as text. Failures never escape as
//! errors: they become `"Error: <message>"` result text.

use crate::args::ArgumentBag;
use crate::commands::OperationRequest;
use crate::config::Config;
use crate::error::OperationError;
use crate::files::{check_input_exists, ensure_dir};
use crate::runner::{resolve_output, ProcessRunner, ToolRunner};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Text payload returned for every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub text: String,
}

impl OperationResult {
    pub fn error(err: &OperationError) -> Self {
        Self {
            text: format!("Error: {}", err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.text.starts_with("Error: ")
    }
}

/// Stateless router from operation names to command builders.
pub struct Dispatcher<R = ProcessRunner> {
    config: Config,
    runner: R,
}

impl Dispatcher<ProcessRunner> {
    /// Dispatcher that spawns the real tools.
    pub fn with_process_runner(config: Config) -> Self {
        Self::new(config, ProcessRunner)
    }
}

impl<R: ToolRunner> Dispatcher<R> {
    pub fn new(config: Config, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run operation `name` with the given argument bag.
    pub async fn dispatch(&self, name: &str, arguments: Option<&Value>) -> OperationResult {
        let started = Instant::now();
        tracing::info!(tool = name, "start");

        match self.execute(name, ArgumentBag::from_value(arguments)).await {
            Ok(text) => {
                tracing::info!(
                    tool = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "ok"
                );
                OperationResult { text }
            }
            Err(e) => {
                tracing::warn!(tool = name, err = %e, "failed");
                OperationResult::error(&e)
            }
        }
    }

    /// Validate, prepare, invoke and format, propagating the first failure.
    ///
    /// Nothing touches the filesystem until every argument has been coerced
    /// and every input path checked.
    pub async fn execute(
        &self,
        name: &str,
        args: ArgumentBag<'_>,
    ) -> Result<String, OperationError> {
        let request = OperationRequest::parse(name, args, &self.config.defaults)?;

        for input in request.input_paths() {
            check_input_exists(input).await?;
        }

        for dir in request.output_dirs() {
            ensure_dir(&dir).await?;
        }

        let invocation = request.build(&self.config.tools);
        tracing::debug!(tool = name, command = %invocation, "running");

        let output = self.runner.run(&invocation).await?;
        let text = resolve_output(&invocation.program, output, self.config.tools.exit_policy)?;

        Ok(request.summarize(&text))
    }
}
