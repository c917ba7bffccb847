//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind both listeners before serving anything (bind failure is fatal)
//! - Create the shared registry and hand it to the notification server only
//! - Run the proxy and notification servers as independent tasks
//!
//! # Design Decisions
//! - The notification listener binds first so a port of 0 (tests) can be
//!   resolved before the snippet is rendered

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::config::RelayConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::{self, ListenerError};
use crate::notification::{NotificationServer, SocketRegistry};

/// Errors that stop the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task panicked: {0}")]
    Task(#[from] JoinError),
}

/// Both listeners, bound and ready to serve.
pub struct Relay {
    proxy: HttpServer,
    proxy_listener: TcpListener,
    notification: NotificationServer,
    notification_listener: TcpListener,
    registry: Arc<SocketRegistry>,
}

impl Relay {
    /// Bind both listeners and build the servers.
    pub async fn bind(mut config: RelayConfig) -> Result<Self, RelayError> {
        let notification_listener =
            net::bind("notification", &config.notification.bind_address()).await?;
        if config.notification.port == 0 {
            config.notification.port = notification_listener.local_addr()?.port();
        }

        let proxy_listener = net::bind("proxy", &config.proxy.bind_address()).await?;

        tracing::info!(
            upstream = %config.upstream.authority(),
            socket_url = %config.notification.socket_url(),
            "Relay configured"
        );

        let registry = Arc::new(SocketRegistry::new());
        Ok(Self {
            proxy: HttpServer::new(&config),
            proxy_listener,
            notification: NotificationServer::new(&config.notification, registry.clone()),
            notification_listener,
            registry,
        })
    }

    pub fn proxy_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.proxy_listener.local_addr()
    }

    pub fn notification_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.notification_listener.local_addr()
    }

    /// The registry shared with the notification server.
    pub fn registry(&self) -> Arc<SocketRegistry> {
        self.registry.clone()
    }

    /// Serve both listeners until `shutdown` fires.
    pub async fn serve(self, shutdown: &Shutdown) -> Result<(), RelayError> {
        let proxy = tokio::spawn(self.proxy.run(self.proxy_listener, shutdown.subscribe()));
        let notification = tokio::spawn(
            self.notification
                .run(self.notification_listener, shutdown.subscribe()),
        );

        let (proxy, notification) = tokio::try_join!(proxy, notification)?;
        proxy?;
        notification?;
        Ok(())
    }
}
