//! HTTP proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request
//!     → server.rs (copy method, target, headers, body)
//!     → upstream server
//!     → server.rs (buffer full body)
//!     → inject.rs (HTML only: snippet before first </body>)
//!     → response.rs (status + headers, exact Content-Length)
//!     → Browser
//! ```

pub mod inject;
pub mod response;
pub mod server;

pub use inject::Snippet;
pub use server::{HttpServer, ProxyError, ProxyState};
