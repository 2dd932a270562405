//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, access log, security headers, CORS,
//!   compression, panic boundary, timeout, body limit, metrics)
//! - Hand the router to the lifecycle controller to bind and serve

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, Router};
use tokio::sync::watch;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};

use crate::api::{self, DataSource, EmptyDataSource};
use crate::config::{EnvironmentName, ServiceConfig, ServiceInfoConfig};
use crate::health::{self, ReadinessChecks};
use crate::http::error::{handle_panic, json_error_body, not_found};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::{
    startup, LifecycleError, LifecycleState, LifecycleTracker, ServerHandle, Shutdown,
};
use crate::observability::{metrics, tracing::access_log_layer};
use crate::security;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub started_at: Instant,
    pub environment: EnvironmentName,
    pub service: ServiceInfoConfig,
    pub readiness: ReadinessChecks,
    pub data_source: Arc<dyn DataSource>,
    pub lifecycle: watch::Receiver<LifecycleState>,
}

/// HTTP server for the service.
pub struct HttpServer {
    config: ServiceConfig,
    readiness: ReadinessChecks,
    data_source: Arc<dyn DataSource>,
    lifecycle: LifecycleTracker,
    shutdown: Shutdown,
    started_at: Instant,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            readiness: ReadinessChecks::new(),
            data_source: Arc::new(EmptyDataSource),
            lifecycle: LifecycleTracker::new(),
            shutdown: Shutdown::new(),
            started_at: Instant::now(),
        }
    }

    /// Replace the readiness checks run by `GET /ready`.
    pub fn with_readiness(mut self, readiness: ReadinessChecks) -> Self {
        self.readiness = readiness;
        self
    }

    /// Replace the source of items for `GET /api/v1/data`.
    pub fn with_data_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.data_source = source;
        self
    }

    /// Use an existing shutdown trigger, e.g. one a signal handler already
    /// holds. Triggering it before `start` makes the server drain right away.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        let state = AppState {
            started_at: self.started_at,
            environment: self.config.environment.clone(),
            service: self.config.service.clone(),
            readiness: self.readiness.clone(),
            data_source: Arc::clone(&self.data_source),
            lifecycle: self.lifecycle.subscribe(),
        };
        build_router(&self.config, state)
    }

    /// Bind the configured port and start serving.
    pub async fn start(self) -> Result<ServerHandle, LifecycleError> {
        let app = self.router();
        tracing::info!(
            address = %self.config.listener.address(),
            environment = %self.config.environment,
            "HTTP server starting"
        );
        startup::start(
            &self.config.listener,
            &self.config.shutdown,
            app,
            self.lifecycle,
            self.shutdown,
        )
        .await
    }
}

/// Build the Axum router with all middleware layers.
///
/// Layers are listed innermost first.
fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .nest("/api/v1", api::routes())
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(security::body_limit_layer(&config.security))
        .layer(security::request_timeout_layer(&config.timeouts))
        .layer(middleware::map_response(json_error_body))
        .layer(CatchPanicLayer::custom(handle_panic));

    if config.http.compression {
        router = router.layer(CompressionLayer::new());
    }

    router = router.layer(security::cors_layer(&config.security.cors));

    if config.security.enable_headers {
        for layer in security::security_header_layers(&config.security) {
            router = router.layer(layer);
        }
    }

    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(access_log_layer())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::{data::BoxFuture, DataError};

    async fn send(server: &HttpServer, method: Method, uri: &str) -> Response {
        server
            .router()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn get(server: &HttpServer, uri: &str) -> Response {
        send(server, Method::GET, uri).await
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    struct FailingSource;

    impl DataSource for FailingSource {
        fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>> {
            Box::pin(async { Err(DataError("upstream unavailable".to_string())) })
        }
    }

    struct PanickingSource;

    impl DataSource for PanickingSource {
        fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>> {
            Box::pin(async { explode() })
        }
    }

    fn explode() -> Result<Vec<Value>, DataError> {
        panic!("data source exploded")
    }

    async fn database_ping() -> Result<(), String> {
        tokio::task::yield_now().await;
        Err("connection refused".to_string())
    }

    struct FixedSource;

    impl DataSource for FixedSource {
        fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>> {
            Box::pin(async { Ok(vec![json!({ "id": 1 })]) })
        }
    }

    #[tokio::test]
    async fn health_reports_liveness() {
        let mut config = ServiceConfig::default();
        config.environment = EnvironmentName("staging".to_string());
        let server = HttpServer::new(config);

        let response = get(&server, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "staging");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        let ts = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn ready_by_default() {
        let server = HttpServer::new(ServiceConfig::default());
        let response = get(&server, "/ready").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn failing_readiness_check_returns_503() {
        let server = HttpServer::new(ServiceConfig::default()).with_readiness(
            ReadinessChecks::new().with_check("database", database_ping),
        );

        let response = get(&server, "/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            json_body(response).await,
            json!({ "status": "not ready", "error": "database: connection refused" })
        );
    }

    #[tokio::test]
    async fn not_ready_while_draining() {
        let server = HttpServer::new(ServiceConfig::default());
        server.lifecycle.advance(LifecycleState::Serving);
        server.lifecycle.advance(LifecycleState::Draining);

        let response = get(&server, "/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"], "server is draining");
    }

    #[tokio::test]
    async fn status_is_static() {
        let server = HttpServer::new(ServiceConfig::default());
        let response = get(&server, "/api/v1/status").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "service": "Backend API", "version": "1.0.0", "status": "running" })
        );
    }

    #[tokio::test]
    async fn data_is_empty_by_default() {
        let server = HttpServer::new(ServiceConfig::default());
        let response = get(&server, "/api/v1/data").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Sample data endpoint");
        assert_eq!(body["data"]["items"], json!([]));
        assert!(body["data"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn data_uses_configured_source() {
        let server = HttpServer::new(ServiceConfig::default()).with_data_source(Arc::new(FixedSource));
        let body = json_body(get(&server, "/api/v1/data").await).await;
        assert_eq!(body["data"]["items"], json!([{ "id": 1 }]));
    }

    #[tokio::test]
    async fn data_source_errors_become_500() {
        let server =
            HttpServer::new(ServiceConfig::default()).with_data_source(Arc::new(FailingSource));

        let response = get(&server, "/api/v1/data").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Internal server error", "message": "upstream unavailable" })
        );
    }

    #[tokio::test]
    async fn unknown_paths_return_404_with_path() {
        let server = HttpServer::new(ServiceConfig::default());
        for path in ["/", "/nope", "/api/v1/missing", "/api/v2/status"] {
            let response = get(&server, path).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
            assert_eq!(
                json_body(response).await,
                json!({ "error": "Not Found", "path": path })
            );
        }
    }

    #[tokio::test]
    async fn unsupported_methods_return_404() {
        let server = HttpServer::new(ServiceConfig::default());
        let response = send(&server, Method::POST, "/health").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["path"], "/health");
    }

    #[tokio::test]
    async fn responses_carry_security_and_request_id_headers() {
        let server = HttpServer::new(ServiceConfig::default());
        let response = get(&server, "/api/v1/status").await;

        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
        assert!(headers.contains_key("strict-transport-security"));
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let server = HttpServer::new(ServiceConfig::default());
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "trace-me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "trace-me");
    }

    #[tokio::test]
    async fn security_headers_can_be_disabled() {
        let mut config = ServiceConfig::default();
        config.security.enable_headers = false;
        let server = HttpServer::new(config);

        let response = get(&server, "/health").await;
        assert!(!response.headers().contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let server = HttpServer::new(ServiceConfig::default());
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/status")
                    .header(header::ORIGIN, "https://frontend.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn panics_become_500() {
        let server =
            HttpServer::new(ServiceConfig::default()).with_data_source(Arc::new(PanickingSource));

        let response = get(&server, "/api/v1/data").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn oversized_bodies_get_json_413() {
        let mut config = ServiceConfig::default();
        config.security.max_body_size = 16;
        let server = HttpServer::new(config);

        let response = server
            .router()
            .oneshot(
                Request::post("/api/v1/data")
                    .header(header::CONTENT_LENGTH, "64")
                    .body(Body::from(vec![b'x'; 64]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(json_body(response).await, json!({ "error": "Payload Too Large" }));
    }

    #[tokio::test]
    async fn timed_out_requests_get_json_408() {
        let mut config = ServiceConfig::default();
        config.timeouts.request_secs = 1;
        let server = HttpServer::new(config).with_data_source(Arc::new(StalledSource));

        let response = get(&server, "/api/v1/data").await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(json_body(response).await, json!({ "error": "Request Timeout" }));
    }

    #[tokio::test]
    async fn records_request_metrics_by_route() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = ::metrics::set_default_local_recorder(&recorder);

        let server = HttpServer::new(ServiceConfig::default());
        assert_eq!(get(&server, "/api/v1/status").await.status(), StatusCode::OK);
        assert_eq!(get(&server, "/nope").await.status(), StatusCode::NOT_FOUND);

        let rendered = handle.render();
        assert!(
            rendered.contains(
                r#"http_requests_total{method="GET",path="/api/v1/status",status="200"} 1"#
            ),
            "{rendered}"
        );
        assert!(
            rendered.contains(r#"http_requests_total{method="GET",path="unmatched",status="404"} 1"#),
            "{rendered}"
        );
        assert!(rendered.contains("http_request_duration_seconds"), "{rendered}");
    }

    struct StalledSource;

    impl DataSource for StalledSource {
        fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>> {
            Box::pin(std::future::pending())
        }
    }

    #[tokio::test]
    async fn compresses_when_accepted() {
        let server = HttpServer::new(ServiceConfig::default())
            .with_data_source(Arc::new(LargeSource));

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/data")
                    .header(header::ACCEPT_ENCODING, "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    }

    struct LargeSource;

    impl DataSource for LargeSource {
        fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>> {
            Box::pin(async { Ok((0..200).map(|i| json!({ "id": i, "name": "item" })).collect()) })
        }
    }
}
