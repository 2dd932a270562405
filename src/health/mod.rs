//! Liveness and readiness endpoints.
//!
//! - `GET /health`: the process is up. Never fails.
//! - `GET /ready`: the process can take traffic. 503 while draining or when
//!   a registered readiness check fails.
//!
//! Both responses carry `Cache-Control: no-cache`.

pub mod readiness;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::http::error::ApiError;
use crate::http::response::timestamp;
use crate::http::server::AppState;
use crate::lifecycle::LifecycleState;

pub use readiness::{ReadinessChecks, ReadinessFailure};

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the process started.
    pub uptime: f64,
    pub environment: String,
}

/// Readiness payload.
#[derive(Debug, Serialize)]
pub struct ReadyStatus {
    pub status: &'static str,
    pub timestamp: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        timestamp: timestamp(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.environment.to_string(),
    })
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyStatus>, ApiError> {
    let lifecycle = *state.lifecycle.borrow();
    if lifecycle >= LifecycleState::Draining {
        return Err(ApiError::Unavailable(format!("server is {}", lifecycle)));
    }

    state.readiness.run().await.map_err(|failure| {
        tracing::warn!(check = %failure.check, error = %failure.message, "Readiness check failed");
        ApiError::Unavailable(failure.to_string())
    })?;

    Ok(Json(ReadyStatus {
        status: "ready",
        timestamp: timestamp(),
    }))
}
