//! Live-reload relay.
//!
//! Proxies a development server, injects a reload snippet into its HTML, and
//! tells every open tab to reload when the trigger endpoint is hit.

use std::sync::Arc;

use clap::Parser;

use live_relay::config::Args;
use live_relay::lifecycle::{signals, Relay, Shutdown};
use live_relay::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("live-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        upstream = %config.upstream.authority(),
        proxy_port = config.proxy.port,
        notification_port = config.notification.port,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    // Bind failures end the process here.
    let relay = Relay::bind(config).await?;

    let shutdown = Arc::new(Shutdown::new());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            shutdown.trigger();
        });
    }

    relay.serve(&shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
