//! Registry of live notification connections.
//!
//! # Responsibilities
//! - Hold every upgraded browser connection under a process-unique id
//! - Fan a signal out to all of them
//! - Drop (and close) any connection whose send fails
//!
//! # Design Decisions
//! - One `tokio::sync::Mutex` guards the map; registration, removal and the
//!   whole broadcast pass run under it, so a broadcast sees a consistent set
//! - Sends within one broadcast run concurrently; a failure only affects its
//!   own connection
//! - Pruning is lazy: a tab that disconnects stays registered until the next
//!   broadcast fails against it
//! - Both pruning and explicit removal go through `detach`, so removal is
//!   idempotent on every path
//! - A broadcast holds the lock across its sends and there is no send
//!   deadline. A peer that stops reading until its TCP buffer fills stalls
//!   registration, status and later triggers until the send completes or
//!   fails

use std::collections::HashMap;
use std::fmt::Display;

use axum::extract::ws::{Message, WebSocket};
use futures_util::future::join_all;
use futures_util::{Sink, SinkExt};
use tokio::sync::Mutex;

use crate::net::ConnectionId;
use crate::observability::metrics;

/// Payload sent to every browser when a reload is triggered.
pub const RELOAD_SIGNAL: &str = "reload";

/// Registry of upgraded browser WebSockets.
pub type SocketRegistry = Registry<WebSocket>;

/// Outcome of a single broadcast pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Connections the signal was written to.
    pub delivered: usize,
    /// Connections removed because the send failed.
    pub removed: usize,
}

/// Synchronized set of open notification connections.
pub struct Registry<S> {
    connections: Mutex<HashMap<ConnectionId, S>>,
}

impl<S> Registry<S> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().await.contains_key(&id)
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Registry<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display + Send,
{
    /// Add a connection to the live set. Visible to every later broadcast.
    pub async fn register(&self, connection: S) -> ConnectionId {
        let id = ConnectionId::new();
        let mut connections = self.connections.lock().await;
        connections.insert(id, connection);
        metrics::record_registered_connections(connections.len());

        tracing::debug!(connection_id = %id, total = connections.len(), "Connection registered");
        id
    }

    /// Close and forget a connection. Removing an unknown id is a no-op.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        let Some(mut connection) = detach(&mut connections, id) else {
            return false;
        };
        drop(connections);

        let _ = connection.close().await;
        true
    }

    /// Send `signal` as a text frame to every registered connection.
    ///
    /// Connections whose send fails are closed and removed; the rest still
    /// receive the signal. Never fails.
    pub async fn broadcast(&self, signal: &str) -> BroadcastSummary {
        let mut connections = self.connections.lock().await;

        let results = join_all(connections.iter_mut().map(|(id, connection)| {
            let message = Message::Text(signal.into());
            async move { (*id, connection.send(message).await) }
        }))
        .await;

        let mut summary = BroadcastSummary::default();
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    tracing::debug!(connection_id = %id, error = %e, "Send failed, dropping connection");
                    failed.push(id);
                }
            }
        }

        for id in failed {
            if let Some(mut connection) = detach(&mut connections, id) {
                let _ = connection.close().await;
                summary.removed += 1;
            }
        }

        metrics::record_broadcast(summary.delivered, summary.removed);
        summary
    }
}

/// Take a connection out of the map, keeping the size gauge current.
fn detach<S>(connections: &mut HashMap<ConnectionId, S>, id: ConnectionId) -> Option<S> {
    let connection = connections.remove(&id)?;
    metrics::record_registered_connections(connections.len());
    Some(connection)
}
