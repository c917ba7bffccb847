//! Notification listener.
//!
//! # Responsibilities
//! - Upgrade browser requests on the socket path and register them
//! - Broadcast the reload signal when the trigger path is hit
//! - Report the number of registered connections for tooling

use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::NotificationConfig;
use crate::notification::registry::{SocketRegistry, RELOAD_SIGNAL};

/// Path of the status endpoint. Reserved on the notification listener.
pub const STATUS_PATH: &str = "/status";

/// State shared by the notification handlers.
#[derive(Clone)]
pub struct NotificationState {
    pub registry: Arc<SocketRegistry>,
}

#[derive(Debug, Serialize)]
pub struct RelayStatus {
    pub version: &'static str,
    pub connections: usize,
}

/// WebSocket notification server.
pub struct NotificationServer {
    router: Router,
}

impl NotificationServer {
    /// Create a notification server backed by `registry`.
    pub fn new(config: &NotificationConfig, registry: Arc<SocketRegistry>) -> Self {
        let state = NotificationState { registry };
        Self {
            router: Self::build_router(config, state),
        }
    }

    fn build_router(config: &NotificationConfig, state: NotificationState) -> Router {
        Router::new()
            .route(&config.socket_path, any(upgrade_handler))
            .route(&config.trigger_path, any(trigger_handler))
            .route(STATUS_PATH, get(status_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Notification server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Notification server stopped");
        Ok(())
    }
}

/// Upgrade to a WebSocket and register it. A failed handshake is dropped
/// without a body and leaves the registry untouched.
async fn upgrade_handler(
    State(state): State<NotificationState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected WebSocket handshake");
            return rejection.status().into_response();
        }
    };

    ws.on_failed_upgrade(|e| tracing::debug!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            let id = state.registry.register(socket).await;
            tracing::info!(connection_id = %id, "Browser connected");
        })
}

/// Broadcast the reload signal to every registered browser.
async fn trigger_handler(State(state): State<NotificationState>) -> StatusCode {
    let summary = state.registry.broadcast(RELOAD_SIGNAL).await;
    tracing::info!(
        delivered = summary.delivered,
        removed = summary.removed,
        "Reload broadcast"
    );
    StatusCode::OK
}

async fn status_handler(State(state): State<NotificationState>) -> Json<RelayStatus> {
    Json(RelayStatus {
        version: env!("CARGO_PKG_VERSION"),
        connections: state.registry.len().await,
    })
}
