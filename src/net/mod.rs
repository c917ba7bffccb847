//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured address
//!     → listener.rs (bind, fatal on failure)
//!     → Hand off to the proxy or notification router
//!
//! Upgraded notification sockets
//!     → connection.rs (process-unique ids used as registry keys)
//! ```

pub mod connection;
pub mod listener;

pub use connection::ConnectionId;
pub use listener::{bind, ListenerError};
