//! Error taxonomy for operation calls
//!
//! None of these cross the transport boundary: the dispatcher renders them
//! as `"Error: <message>"` result text.

use crate::runner::ToolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation name is not one of the supported set
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    /// A required argument is absent or empty
    #[error("{0} is required")]
    MissingArgument(String),

    /// An argument is present but unusable
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// A declared input path does not exist
    #[error("Input file does not exist: {0}")]
    InputNotFound(String),

    /// The output directory could not be created
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputPrepFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    ToolInvocationFailed(#[from] ToolError),
}

impl OperationError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        OperationError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
