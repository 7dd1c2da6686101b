//! The `rxscan serve` command.

use clap::Args;
use rxscan_core::Config;
use std::net::SocketAddr;

use super::build_extractor;
use crate::web::{start_server, AppState};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let extractor = build_extractor(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            anyhow::anyhow!(
                "Invalid listen address {}:{}: {e}",
                config.server.host,
                config.server.port
            )
        })?;

    tracing::info!(
        provider = extractor.spec().kind.as_str(),
        model = %extractor.spec().model,
        "Ready to extract"
    );
    start_server(addr, AppState::new(config, extractor)).await
}
