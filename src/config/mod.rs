//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → config file (TOML, loader.rs)
//!     → command-line flags (args.rs)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; nothing reloads it
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{load_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, NotificationConfig, ObservabilityConfig, RelayConfig,
    UpstreamConfig,
};
