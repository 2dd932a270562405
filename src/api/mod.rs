//! Versioned API routes, mounted under `/api/v1`.

pub mod data;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::http::error::ApiError;
use crate::http::response::timestamp;
use crate::http::server::AppState;

pub use data::{DataError, DataSource, EmptyDataSource};

/// Static service descriptor.
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub version: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub message: &'static str,
    pub data: DataPayload,
}

#[derive(Debug, Serialize)]
pub struct DataPayload {
    pub timestamp: String,
    pub items: Vec<Value>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/data", get(data))
}

async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        service: state.service.name.clone(),
        version: state.service.version.clone(),
        status: "running",
    })
}

async fn data(State(state): State<AppState>) -> Result<Json<DataResponse>, ApiError> {
    let items = state.data_source.fetch_items().await.map_err(|e| {
        tracing::error!(error = %e, "Error fetching data");
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(DataResponse {
        message: "Sample data endpoint",
        data: DataPayload {
            timestamp: timestamp(),
            items,
        },
    }))
}
