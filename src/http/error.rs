//! Error boundary: maps handler outcomes to HTTP responses.
//!
//! Handlers return `Result<_, ApiError>`. Every error becomes a JSON body
//! with an `error` field; nothing escapes to the connection task. Panics are
//! caught by [`handle_panic`] and reported as a bare 500.

use std::any::Any;

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No route matched the request.
    #[error("Not Found")]
    NotFound { path: String },

    /// The service cannot take traffic right now.
    #[error("{0}")]
    Unavailable(String),

    /// An unexpected failure while producing the response.
    #[error("{0}")]
    Internal(String),

    /// An error with an explicit status code.
    #[error("{message}")]
    Http { status: StatusCode, message: String },
}

impl ApiError {
    /// Error with an explicit status code.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Http { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        }

        let body = match self {
            ApiError::NotFound { path } => json!({ "error": "Not Found", "path": path }),
            ApiError::Unavailable(message) => json!({ "status": "not ready", "error": message }),
            ApiError::Internal(message) => {
                json!({ "error": "Internal server error", "message": message })
            }
            ApiError::Http { message, .. } => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Fallback for requests that match no route or no method.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        path: uri.path().to_string(),
    }
}

/// Rewrite error responses produced outside the handlers as JSON.
///
/// Middleware such as the body limit and the request timeout answer with
/// plain text or an empty body. Any 4xx/5xx response that is not already
/// JSON gets an `{ "error": <reason phrase> }` body; its other headers are kept.
pub async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    let (parts, _) = response.into_parts();
    let message = status.canonical_reason().unwrap_or("Error");
    let mut rewritten = ApiError::new(status, message).into_response();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rewritten.headers_mut().append(name.clone(), value.clone());
        }
    }
    rewritten
}

/// Convert a handler panic into a 500 response.
///
/// The panic payload is logged but never returned to the client.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
