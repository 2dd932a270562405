//! Startup orchestration.
//!
//! Binds the listener and spawns the serving task. Any bind error is fatal:
//! the lifecycle moves straight to `Stopped` and nothing is served.

use std::net::SocketAddr;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ListenerConfig, ShutdownConfig};
use crate::http::error::ApiError;
use crate::lifecycle::handle::ServerHandle;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::state::{LifecycleState, LifecycleTracker};

/// Error type for lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The configured address could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The serving loop returned an error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The serving task panicked or was cancelled.
    #[error("Server task failed: {0}")]
    Task(String),
}

/// Bind a TCP listener for the configured host and port.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, LifecycleError> {
    let address = config.address();
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| LifecycleError::Bind {
            address: address.clone(),
            source,
        })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| LifecycleError::Bind { address, source })?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}

/// Bind the listener and start serving `app`.
///
/// `lifecycle` must still be in `Starting`; it moves to `Serving` once the
/// listener is bound, to `Draining` when `shutdown` fires, and to `Stopped`
/// when the serving loop exits. `shutdown` may already be triggered, in
/// which case the server drains immediately after binding.
pub async fn start(
    listener_config: &ListenerConfig,
    shutdown_config: &ShutdownConfig,
    app: Router,
    lifecycle: LifecycleTracker,
    shutdown: Shutdown,
) -> Result<ServerHandle, LifecycleError> {
    let listener = match bind(listener_config).await {
        Ok(listener) => listener,
        Err(e) => {
            lifecycle.advance(LifecycleState::Stopped);
            return Err(e);
        }
    };
    let local_addr = listener.local_addr().map_err(LifecycleError::Serve)?;

    // Fired when the drain timeout elapses; cancels handlers still running.
    let cutoff = Shutdown::new();
    let app = app.layer(middleware::from_fn_with_state(cutoff.clone(), cancel_on_cutoff));

    lifecycle.advance(LifecycleState::Serving);

    let task = {
        let signal = shutdown.clone();
        let draining = lifecycle.clone();
        let stopped = lifecycle.clone();

        tokio::spawn(async move {
            let result = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                signal.wait().await;
                draining.advance(LifecycleState::Draining);
            })
            .await;

            stopped.advance(LifecycleState::Stopped);
            tracing::info!("HTTP server stopped");
            result
        })
    };

    Ok(ServerHandle::new(
        local_addr,
        shutdown,
        cutoff,
        lifecycle,
        shutdown_config.drain_timeout(),
        task,
    ))
}

/// Run the handler unless the drain cutoff fires first, in which case the
/// handler future is dropped and the client gets a 503.
async fn cancel_on_cutoff(State(cutoff): State<Shutdown>, request: Request, next: Next) -> Response {
    tokio::select! {
        response = next.run(request) => response,
        _ = cutoff.wait() => {
            tracing::warn!("Request cancelled at drain timeout");
            ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Server shutting down").into_response()
        }
    }
}
