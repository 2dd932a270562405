//! Backend API service library.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ lifecycle (listener) ──▶ http (middleware stack) ──▶ health / api
//!                                                                          │
//!     Client Response                                                      │
//!     ◀────────────── http::error (JSON errors) ◀──────────────────────────┘
//!
//!     Cross-cutting: config, observability, security
//! ```
//!
//! The lifecycle is `Starting → Serving → Draining → Stopped`: a termination
//! signal stops new connections, lets in-flight requests finish, then the
//! process exits with status 0.

pub mod api;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{LifecycleState, ServerHandle, Shutdown, ShutdownOutcome};
