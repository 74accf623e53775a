//! HTTP transport for the dispatcher
//!
//! Exposes the same operations as the stdio transport for clients that
//! prefer plain HTTP: `GET /tools`, `POST /tools/call` and `GET /health`.

use axum::{extract::State, routing::get, routing::post, Json, Router};
use rmcp::model::{CallToolRequestParam, CallToolResult, ListToolsResult};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::dispatcher::Dispatcher;
use crate::protocol;
use crate::runner::ToolRunner;

/// Errors that can occur when running the HTTP server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

/// Handler for GET /tools
async fn list_tools() -> Json<ListToolsResult> {
    Json(protocol::list_tools())
}

/// Handler for POST /tools/call
///
/// Operation failures come back as `200` with `"Error: ..."` text.
async fn call_tool<R: ToolRunner + 'static>(
    State(dispatcher): State<Arc<Dispatcher<R>>>,
    Json(request): Json<CallToolRequestParam>,
) -> Json<CallToolResult> {
    Json(protocol::call_tool(&dispatcher, request).await)
}

async fn health() -> &'static str {
    "ok"
}

/// Creates the axum Router for the operation endpoints
pub fn create_router<R: ToolRunner + 'static>(dispatcher: Arc<Dispatcher<R>>) -> Router {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/call", post(call_tool::<R>))
        .route("/health", get(health))
        .with_state(dispatcher)
}

/// Runs the HTTP server on the configured address until it fails
pub async fn run_http_server<R: ToolRunner + 'static>(
    dispatcher: Arc<Dispatcher<R>>,
    addr: &str,
) -> Result<(), ServerError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|_| ServerError::InvalidAddress(addr.to_string()))?;
    let app = create_router(dispatcher);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http transport listening");
    axum::serve(listener, app).await?;

    Ok(())
}
