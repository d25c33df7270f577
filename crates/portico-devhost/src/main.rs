//! portico-dev — local development host.
//!
//! Serves a wrapped application through the bridge over plain HTTP,
//! standing in for the serverless platform during development.
//!
//! # Usage
//!
//! ```text
//! portico-dev --bind 127.0.0.1:3333 --config portico.toml
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use portico_bridge::{Bridge, echo_app};
use portico_core::PorticoConfig;
use portico_devhost::HttpHost;

#[derive(Parser)]
#[command(name = "portico-dev", about = "Portico local development host")]
struct Cli {
    /// Address to listen on. Overrides the config file.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Path to portico.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "info,portico_bridge=debug,portico_devhost=debug"
                        .parse()
                        .unwrap()
                }),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PorticoConfig::from_file(path)?,
        None => PorticoConfig::default(),
    };

    let bind_addr = resolve_bind(&cli, &config)?;
    let defaults = config.gateway_defaults();

    // The demo application stands in for a real wrapped application;
    // swap the factory to mount your own.
    let bridge = Arc::new(Bridge::new(|| Ok(echo_app())).with_defaults(defaults));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let host = HttpHost::new(bind_addr, bridge);

    let server = tokio::spawn(async move { host.serve(shutdown_rx).await });

    tokio::signal::ctrl_c().await?;
    info!("ctrl-c received, shutting down");
    let _ = shutdown_tx.send(true);

    server.await??;
    Ok(())
}

fn resolve_bind(cli: &Cli, config: &PorticoConfig) -> anyhow::Result<SocketAddr> {
    if let Some(addr) = cli.bind {
        return Ok(addr);
    }
    if let Some(bind) = config.host.as_ref().and_then(|h| h.bind.as_ref()) {
        return bind
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {bind:?}: {e}"));
    }
    Ok("127.0.0.1:3333".parse().expect("default bind address"))
}
