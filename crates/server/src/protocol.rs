//! MCP transport over newline-delimited stdio
//!
//! `rmcp` owns the protocol: handshake, version negotiation, request ids and
//! error codes. [`McpServer`] answers `tools/list` from the catalog and hands
//! `tools/call` to the [`Dispatcher`].
//!
//! Incoming lines are screened before they reach the session. A line that is
//! not JSON, or not a JSON-RPC message, gets an error reply and the session
//! keeps running.

use crate::catalog::tool_definitions;
use crate::dispatcher::{Dispatcher, OperationResult};
use crate::runner::ToolRunner;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ClientJsonRpcMessage, Content, ErrorCode, Implementation,
    ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// In-memory pipe size between the line screen and the MCP session.
const SESSION_BUFFER: usize = 64 * 1024;

/// Error type for the transport itself
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MCP session failed to start: {0}")]
    Initialize(String),

    #[error("MCP session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<OperationResult> for CallToolResult {
    fn from(result: OperationResult) -> Self {
        CallToolResult::success(vec![Content::text(result.text)])
    }
}

/// The catalog as a `tools/list` result.
pub fn list_tools() -> ListToolsResult {
    ListToolsResult::with_all_items(tool_definitions())
}

/// Run one `tools/call` through the dispatcher. Operation failures are
/// `"Error: ..."` text, never protocol errors.
pub async fn call_tool<R: ToolRunner>(
    dispatcher: &Dispatcher<R>,
    request: CallToolRequestParam,
) -> CallToolResult {
    let arguments = request.arguments.map(Value::Object);
    dispatcher
        .dispatch(&request.name, arguments.as_ref())
        .await
        .into()
}

/// MCP front end for a [`Dispatcher`].
pub struct McpServer<R> {
    dispatcher: Dispatcher<R>,
}

impl<R: ToolRunner + 'static> McpServer<R> {
    pub fn new(dispatcher: Dispatcher<R>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<R> {
        &self.dispatcher
    }

    /// Serve one MCP session read from `reader` and written to `writer`,
    /// until the input closes.
    pub async fn run<Rd, W>(self, reader: Rd, writer: W) -> Result<(), ProtocolError>
    where
        Rd: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (session_io, screen_io) = tokio::io::duplex(SESSION_BUFFER);
        let (from_session, to_session) = tokio::io::split(screen_io);
        let (replies, outgoing) = unbounded_channel();

        let inbound = tokio::spawn(screen_requests(reader, to_session, replies.clone()));
        let outbound = tokio::spawn(collect_responses(BufReader::new(from_session), replies));
        let output = tokio::spawn(write_replies(outgoing, writer));

        let session = ServiceExt::serve(self, tokio::io::split(session_io))
            .await
            .map_err(|e| ProtocolError::Initialize(e.to_string()))?;
        let reason = session.waiting().await?;
        tracing::info!(?reason, "session closed");

        // the session can end before input does
        inbound.abort();
        outbound.await??;
        output.await??;
        Ok(())
    }

    /// Serve on the process's stdin and stdout.
    pub async fn run_stdio(self) -> Result<(), ProtocolError> {
        self.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

impl<R: ToolRunner + 'static> ServerHandler for McpServer<R> {
    fn get_info(&self) -> ServerInfo {
        let server = &self.dispatcher.config().server;
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: server.name.clone(),
                version: server.version.clone(),
                ..Implementation::default()
            },
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(list_tools())
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(call_tool(&self.dispatcher, request).await)
    }
}

/// What to do with one incoming line.
#[derive(Debug, Clone, PartialEq)]
enum Screened {
    /// Well-formed; hand it to the session
    Forward,
    /// Malformed; answer with this error response
    Reject(Value),
    /// Malformed notification; nobody is waiting for a reply
    Ignore,
}

fn error_reply(id: Value, code: ErrorCode, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": McpError::new(code, message, None),
    })
}

fn screen_line(line: &[u8]) -> Screened {
    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(e) => {
            return Screened::Reject(error_reply(
                Value::Null,
                ErrorCode::PARSE_ERROR,
                format!("Parse error: {}", e),
            ))
        }
    };

    let id = value.get("id").cloned();
    if let Some(id) = &id {
        if !(id.is_string() || id.is_number()) {
            return Screened::Reject(error_reply(
                id.clone(),
                ErrorCode::INVALID_REQUEST,
                "Invalid request: id must be a string or a number".to_string(),
            ));
        }
    }

    match serde_json::from_value::<ClientJsonRpcMessage>(value) {
        Ok(_) => Screened::Forward,
        Err(e) => match id {
            Some(id) => Screened::Reject(error_reply(
                id,
                ErrorCode::INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )),
            None => Screened::Ignore,
        },
    }
}

/// Strip the line terminator and surrounding ASCII whitespace.
fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}

fn encode_reply(reply: &Value) -> Vec<u8> {
    let mut bytes = reply.to_string().into_bytes();
    bytes.push(b'\n');
    bytes
}

/// Read raw lines from the client, forwarding well-formed messages to the
/// session and answering the rest directly.
async fn screen_requests<Rd, W>(
    mut reader: Rd,
    mut session: W,
    replies: UnboundedSender<Vec<u8>>,
) -> std::io::Result<()>
where
    Rd: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = trim_line(&buf);
        if line.is_empty() {
            continue;
        }

        match screen_line(line) {
            Screened::Forward => {
                session.write_all(line).await?;
                session.write_all(b"\n").await?;
                session.flush().await?;
            }
            Screened::Reject(reply) => {
                tracing::warn!(error = %reply["error"]["message"], "rejected malformed message");
                if replies.send(encode_reply(&reply)).is_err() {
                    break;
                }
            }
            Screened::Ignore => tracing::debug!("dropped malformed notification"),
        }
    }
    tracing::info!("input closed, shutting down");
    session.shutdown().await
}

/// Copy the session's response lines into the outgoing queue.
async fn collect_responses<Rd>(
    mut session: Rd,
    replies: UnboundedSender<Vec<u8>>,
) -> std::io::Result<()>
where
    Rd: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    while session.read_until(b'\n', &mut line).await? > 0 {
        if replies.send(std::mem::take(&mut line)).is_err() {
            break;
        }
    }
    Ok(())
}

/// Single writer for everything sent to the client.
async fn write_replies<W>(
    mut outgoing: UnboundedReceiver<Vec<u8>>,
    mut writer: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = outgoing.recv().await {
        writer.write_all(&reply).await?;
        writer.flush().await?;
    }
    Ok(())
}
