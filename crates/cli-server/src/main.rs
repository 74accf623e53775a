//! CLI entry point for FFmpeg Helper
//!
//! Parses command line arguments, loads configuration and serves media
//! operations over stdio JSON-RPC or HTTP. Stdout belongs to the protocol,
//! so all diagnostics go to stderr.

use clap::Parser;
use ffmpeg_helper::{run_http_server, run_startup_checks, Config, Dispatcher, McpServer};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// FFmpeg Helper - video and audio editing operations for tool-calling clients
#[derive(Parser, Debug)]
#[command(name = "ffmpeg-helper")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file; defaults apply when it is missing
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Serve over HTTP instead of stdio
    #[arg(long, default_value = "false")]
    http: bool,

    /// Listen address for the HTTP transport (overrides config)
    #[arg(long)]
    http_addr: Option<String>,

    /// Skip startup checks (ffmpeg/ffprobe availability). For testing only.
    #[arg(long, default_value = "false")]
    skip_checks: bool,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let mut config = match Config::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(config = %args.config.display(), "failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(addr) = args.http_addr {
        config.server.http_addr = addr;
    }

    if args.skip_checks {
        tracing::warn!("skipping startup checks (--skip-checks enabled)");
    } else {
        match run_startup_checks(&config.tools) {
            Ok(versions) => {
                tracing::info!(
                    ffmpeg = %versions.ffmpeg,
                    ffprobe = %versions.ffprobe,
                    "tools available"
                );
            }
            Err(e) => {
                tracing::error!("startup check failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    tracing::info!(
        name = %config.server.name,
        version = %config.server.version,
        exit_policy = ?config.tools.exit_policy,
        "server starting"
    );

    if args.http {
        let addr = config.server.http_addr.clone();
        let dispatcher = Arc::new(Dispatcher::with_process_runner(config));
        if let Err(e) = run_http_server(dispatcher, &addr).await {
            tracing::error!("http server error: {}", e);
            return ExitCode::FAILURE;
        }
    } else {
        let server = McpServer::new(Dispatcher::with_process_runner(config));
        if let Err(e) = server.run_stdio().await {
            tracing::error!("stdio transport error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
