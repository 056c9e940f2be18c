//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides, cluster config fallback)
//!     → validation.rs (semantic checks)
//!     → AdminConfig (validated, immutable)
//!     → shared via AppState to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, AggregatorConfig, AuthConfig, CacheConfig, CacheSourceKind, LogFormat,
    ObservabilityConfig, ServerConfig, TimeoutConfig, UpstreamConfig,
};
