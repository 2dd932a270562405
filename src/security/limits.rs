//! Request limits.
//!
//! - Body size: 413 Payload Too Large once `security.max_body_size` is exceeded
//! - Duration: 408 Request Timeout after `timeouts.request_secs`

use std::time::Duration;

use axum::http::StatusCode;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use crate::config::{SecurityConfig, TimeoutConfig};

pub fn body_limit_layer(config: &SecurityConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}

pub fn request_timeout_layer(config: &TimeoutConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_secs),
    )
}
