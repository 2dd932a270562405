//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (accepted by lifecycle::startup)
//!     → request.rs (assign x-request-id)
//!     → server.rs (middleware stack, routing)
//!     → health / api handlers
//!     → error.rs (ApiError and panics → JSON error response)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
