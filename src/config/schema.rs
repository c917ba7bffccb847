//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the live-reload relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// The application server being proxied.
    pub upstream: UpstreamConfig,

    /// Public-facing proxy listener.
    pub proxy: ListenerConfig,

    /// WebSocket notification listener.
    pub notification: NotificationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Buffering limits.
    pub limits: LimitsConfig,
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Hostname of the upstream server.
    pub host: String,

    /// Port of the upstream server.
    pub port: u16,
}

impl UpstreamConfig {
    /// Authority (`host:port`) requests are forwarded to.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

/// Proxy listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Notification listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind. Also embedded in the injected snippet.
    pub port: u16,

    /// Host the browser uses to reach this listener.
    pub public_host: String,

    /// Path that upgrades to a WebSocket.
    pub socket_path: String,

    /// Path that triggers a broadcast.
    pub trigger_path: String,
}

impl NotificationConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// WebSocket URL written into the injected snippet.
    pub fn socket_url(&self) -> String {
        format!("ws://{}:{}{}", self.public_host, self.port, self.socket_path)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            public_host: "localhost".to_string(),
            socket_path: "/ws".to_string(),
            trigger_path: "/reload".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Limits on buffered payloads.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest upstream body the proxy will buffer, in bytes.
    pub max_response_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_response_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}
