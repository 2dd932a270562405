//! End-to-end endpoint tests over a real socket.

use std::time::Duration;

use backend_api::HttpServer;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn serves_placeholder_endpoints() {
    let mut config = common::test_config();
    config.environment = backend_api::config::EnvironmentName("test".to_string());
    let handle = HttpServer::new(config).start().await.unwrap();
    let base = format!("http://{}", handle.local_addr());
    let client = common::client();

    let health = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(health.status(), 200);
    let body: Value = health.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);

    let ready = client.get(format!("{base}/ready")).send().await.unwrap();
    assert_eq!(ready.status(), 200);

    let status = client.get(format!("{base}/api/v1/status")).send().await.unwrap();
    assert_eq!(status.status(), 200);
    assert_eq!(
        status.json::<Value>().await.unwrap(),
        json!({ "service": "Backend API", "version": "1.0.0", "status": "running" })
    );

    let data = client.get(format!("{base}/api/v1/data")).send().await.unwrap();
    assert_eq!(data.status(), 200);
    let body: Value = data.json().await.unwrap();
    assert_eq!(body["data"]["items"], json!([]));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unmatched_route_returns_404_with_path() {
    let handle = HttpServer::new(common::test_config()).start().await.unwrap();
    let client = common::client();

    let response = client
        .get(format!("http://{}/does/not/exist", handle.local_addr()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Not Found", "path": "/does/not/exist" })
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut config = common::test_config();
    config.security.max_body_size = 32;
    let handle = HttpServer::new(config).start().await.unwrap();
    let client = common::client();

    let response = client
        .post(format!("http://{}/api/v1/data", handle.local_addr()))
        .body(vec![b'x'; 1024])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Payload Too Large" })
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn slow_request_times_out_with_json_body() {
    let (source, _entered) = common::SlowSource::new(Duration::from_secs(30));
    let mut config = common::test_config();
    config.timeouts.request_secs = 1;
    config.shutdown.drain_timeout_secs = 1;
    let handle = HttpServer::new(config)
        .with_data_source(source)
        .start()
        .await
        .unwrap();
    let client = common::client();

    let response = client
        .get(format!("http://{}/api/v1/data", handle.local_addr()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 408);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "Request Timeout" })
    );

    handle.shutdown().await.unwrap();
}
