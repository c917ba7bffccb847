//! TCP listener binding.
//!
//! A listener that cannot bind its configured address cannot do its job, so
//! callers treat [`ListenerError`] as fatal.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {service} listener on {address}: {source}")]
    Bind {
        service: &'static str,
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind a TCP listener for the named service.
pub async fn bind(service: &'static str, address: &str) -> Result<TcpListener, ListenerError> {
    let bind_err = |source| ListenerError::Bind {
        service,
        address: address.to_string(),
        source,
    };

    let listener = TcpListener::bind(address).await.map_err(bind_err)?;
    let local_addr: SocketAddr = listener.local_addr().map_err(bind_err)?;

    tracing::info!(
        service,
        address = %local_addr,
        "Listener bound"
    );

    Ok(listener)
}
