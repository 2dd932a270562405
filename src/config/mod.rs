//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (optional, dotenvy)
//!     → config file (TOML, optional)
//!     → loader.rs (parse, apply PORT / APP_ENV / ... overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the service runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, EnvironmentName, HttpConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SecurityConfig, ServiceConfig, ServiceInfoConfig, ShutdownConfig, TimeoutConfig,
};
