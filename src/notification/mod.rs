//! Notification subsystem.
//!
//! # Data Flow
//! ```text
//! Browser (injected snippet)
//!     → server.rs socket path (WebSocket upgrade)
//!     → registry.rs register
//!
//! External trigger (watcher, relay-cli, curl)
//!     → server.rs trigger path
//!     → registry.rs broadcast "reload"
//!     → every registered browser reloads
//! ```
//!
//! The registry is the only state shared with anything else at runtime; the
//! proxy listener never touches it.

pub mod registry;
pub mod server;

pub use registry::{BroadcastSummary, Registry, SocketRegistry, RELOAD_SIGNAL};
pub use server::{NotificationServer, NotificationState, STATUS_PATH};
