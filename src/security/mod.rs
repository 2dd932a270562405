//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight answered, allowed origins echoed)
//!     → limits.rs (request body size, request duration)
//!     → handler
//! Outgoing response:
//!     → headers.rs (hardened response headers)
//! ```
//!
//! # Design Decisions
//! - Headers never override values a handler set explicitly
//! - Limits reject early with 413 / 408 rather than buffering

pub mod cors;
pub mod headers;
pub mod limits;

pub use cors::cors_layer;
pub use headers::{security_header_layers, security_headers};
pub use limits::{body_limit_layer, request_timeout_layer};
