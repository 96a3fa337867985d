//! Screen spec MCP server.
//! Exposes screen lookup and index maintenance tools over stdio.

mod params;
mod server;
mod tools;

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use server::ScreenServer;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let project_root = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    tracing::info!("screen spec MCP server starting for: {}", project_root.display());

    let server = ScreenServer::new(project_root)?;
    let service = server
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("serve error: {}", e))
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    service.waiting().await?;

    Ok(())
}
