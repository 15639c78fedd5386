//! Planwise server binary.

use anyhow::Result;
use clap::Parser;
use planwise_core::AgentConfig;
use planwise_server::{build_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Event analysis service: agent dispatch over HTTP.
#[derive(Debug, Parser)]
#[command(name = "planwise-server", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: SocketAddr,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .init();

    let config = AgentConfig::from_env();
    info!(
        llm_configured = config.llm_api_key.is_some(),
        weather_configured = config.weather_api_key.is_some(),
        "starting planwise server"
    );

    let state = Arc::new(AppState::new(config));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(addr = %args.bind, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
