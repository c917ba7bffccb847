//! Command-line flags.
//!
//! Flags override values from the config file, which override defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::RelayConfig;

#[derive(Debug, Parser)]
#[command(name = "live-relay")]
#[command(about = "Live-reload relay in front of a development HTTP server", long_about = None)]
pub struct Args {
    /// The port of the original server to proxy requests to
    #[arg(long = "from", value_name = "PORT")]
    pub upstream_port: Option<u16>,

    /// The port to run the proxy server on
    #[arg(long = "to", value_name = "PORT")]
    pub proxy_port: Option<u16>,

    /// The port to run the WebSocket server on
    #[arg(long = "via", value_name = "PORT")]
    pub notification_port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Build the effective configuration: defaults, then file, then flags.
    pub fn into_config(self) -> Result<RelayConfig, ConfigError> {
        load_config(self.config.as_deref(), |config| self.apply(config))
    }

    fn apply(&self, config: &mut RelayConfig) {
        if let Some(port) = self.upstream_port {
            config.upstream.port = port;
        }
        if let Some(port) = self.proxy_port {
            config.proxy.port = port;
        }
        if let Some(port) = self.notification_port {
            config.notification.port = port;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}
