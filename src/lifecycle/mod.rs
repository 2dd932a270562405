//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Bind listener → Serving → spawn serve task → ServerHandle
//!
//! Shutdown (shutdown.rs, handle.rs):
//!     Trigger → stop accepting (Draining) → in-flight requests finish
//!     → listener closed (Stopped) → exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//!     second signal → forced exit
//! ```
//!
//! # Design Decisions
//! - The handle is passed explicitly; there is no global server instance
//! - State transitions are forward-only (state.rs)
//! - Draining is bounded by `shutdown.drain_timeout_secs` unless set to 0

pub mod handle;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use handle::ServerHandle;
pub use shutdown::{Shutdown, ShutdownOutcome};
pub use startup::LifecycleError;
pub use state::{LifecycleState, LifecycleTracker};
