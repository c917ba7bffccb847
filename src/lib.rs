//! Live-reload relay library.
//!
//! Two listeners share one piece of state:
//!
//! ```text
//!   Browser ──HTTP──▶ proxy listener ──▶ upstream dev server
//!      ▲                  │ (HTML: reload snippet spliced in)
//!      │                  ▼
//!      └──── WebSocket ── notification listener ◀── trigger (watcher, relay-cli)
//!                           │
//!                        registry
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod notification;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::{Relay, Shutdown};
pub use notification::{NotificationServer, SocketRegistry};
