//! Data source behind `GET /api/v1/data`.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure while retrieving items.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DataError(pub String);

/// Supplies the items returned by the data endpoint.
pub trait DataSource: Send + Sync {
    fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>>;
}

/// Always returns an empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDataSource;

impl DataSource for EmptyDataSource {
    fn fetch_items(&self) -> BoxFuture<'_, Result<Vec<Value>, DataError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
