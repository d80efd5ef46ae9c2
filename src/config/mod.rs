//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! argv
//!     → cli.rs (positional address, --config path)
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//! process environment
//!     → env.rs (read once, during startup only)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow running without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::{resolve_listen_address, Cli};
pub use env::{Environment, ProcessEnv};
pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AdapterConfig, DownstreamConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    DEFAULT_ADAPTER_PORT,
};
pub use validation::{validate_config, ValidationError};
