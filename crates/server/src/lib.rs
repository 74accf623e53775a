//! FFmpeg Helper
//!
//! Tool server that turns named media operations with JSON arguments into
//! ffmpeg/ffprobe invocations and reports their outcome as text.

pub mod args;
pub mod catalog;
pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod files;
pub mod http_server;
pub mod invocation;
pub mod protocol;
pub mod runner;
pub mod startup;

pub use args::ArgumentBag;
pub use catalog::tool_definitions;
pub use commands::{OperationRequest, OPERATION_NAMES};
pub use dispatcher::{Dispatcher, OperationResult};
pub use error::OperationError;
pub use ffmpeg_helper_config as config;
pub use ffmpeg_helper_config::{Config, ExitPolicy};
pub use http_server::{create_router, run_http_server, ServerError};
pub use invocation::Invocation;
pub use protocol::{call_tool, list_tools, McpServer, ProtocolError};
pub use runner::{resolve_output, ProcessRunner, ToolError, ToolOutput, ToolRunner};
pub use startup::{
    check_tool_version, parse_major_version, parse_tool_version, run_startup_checks, StartupError,
    ToolVersions,
};
