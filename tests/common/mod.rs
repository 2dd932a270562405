//! Shared utilities for integration tests.

use std::sync::Arc;
use std::time::Duration;

use backend_api::api::{data::BoxFuture, DataError, DataSource};
use backend_api::ServiceConfig;
use serde_json::Value;
use tokio::sync::Notify;

/// Default config bound to an ephemeral loopback port.
#[allow(dead_code)]
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config
}

/// HTTP client without connection pooling or system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Data source that signals when a request enters it, then sleeps.
#[allow(dead_code)]
pub struct SlowSource {
    pub delay: Duration,
    pub entered: Arc<Notify>,
}

#[allow(dead_code)]
impl SlowSource {
    pub fn new(delay: Duration) -> (Arc<Self>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let source = Arc::new(Self {
            delay,
            entered: Arc::clone(&entered),
        });
        (source, entered)
    }
}

impl DataSource for SlowSource {
    fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>> {
        Box::pin(async move {
            self.entered.notify_one();
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        })
    }
}
