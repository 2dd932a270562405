//! Per-request access log spans.
//!
//! Every request runs inside an `http_request` span carrying method, URI,
//! HTTP version, peer address and request ID. The response is logged at
//! INFO with status and latency, which gives one access-log line per request.

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::Request};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnResponse, MakeSpan, TraceLayer},
    LatencyUnit,
};
use tracing::{Level, Span};

use crate::http::request::request_id;

/// Builds the `http_request` span.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogSpan;

impl<B> MakeSpan<B> for AccessLogSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "-".to_string());

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
            remote_addr = %remote_addr,
            request_id = %request_id(request).unwrap_or("-"),
        )
    }
}

pub type AccessLogLayer = TraceLayer<SharedClassifier<ServerErrorsAsFailures>, AccessLogSpan>;

/// Access log layer for the HTTP stack.
pub fn access_log_layer() -> AccessLogLayer {
    TraceLayer::new_for_http()
        .make_span_with(AccessLogSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}
