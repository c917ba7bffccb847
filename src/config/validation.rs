//! Configuration validation.
//!
//! Serde handles syntax; this checks values that would leave a listener
//! unable to start or the two services stepping on each other. All errors
//! are collected, not just the first.

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::notification::STATUS_PATH;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} port must be non-zero")]
    ZeroPort(&'static str),

    #[error("proxy and notification listeners both use port {0}")]
    PortConflict(u16),

    #[error("upstream host must not be empty")]
    EmptyUpstreamHost,

    #[error("{field} must start with '/', got {value:?}")]
    RelativePath { field: &'static str, value: String },

    #[error("socket_path and trigger_path are both {0:?}")]
    PathConflict(String),

    #[error("{field} {value:?} is reserved for the status endpoint")]
    ReservedPath { field: &'static str, value: String },
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, port) in [
        ("upstream", config.upstream.port),
        ("proxy", config.proxy.port),
        ("notification", config.notification.port),
    ] {
        if port == 0 {
            errors.push(ValidationError::ZeroPort(name));
        }
    }

    if config.proxy.port != 0 && config.proxy.port == config.notification.port {
        errors.push(ValidationError::PortConflict(config.proxy.port));
    }

    if config.upstream.host.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstreamHost);
    }

    let notification = &config.notification;
    for (field, value) in [
        ("socket_path", &notification.socket_path),
        ("trigger_path", &notification.trigger_path),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                value: value.clone(),
            });
        } else if value == STATUS_PATH {
            errors.push(ValidationError::ReservedPath {
                field,
                value: value.clone(),
            });
        }
    }

    if notification.socket_path == notification.trigger_path {
        errors.push(ValidationError::PathConflict(notification.socket_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
