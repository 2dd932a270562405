//! Readiness checks.
//!
//! A readiness check is a named async function resolving to `Err(message)` when
//! a dependency is unavailable. None are registered by default, so the
//! service reports ready as soon as it is serving.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::api::data::BoxFuture;

type CheckFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// A failed readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{check}: {message}")]
pub struct ReadinessFailure {
    pub check: String,
    pub message: String,
}

/// Registered readiness checks, run in registration order.
#[derive(Clone, Default)]
pub struct ReadinessChecks {
    checks: Vec<(String, CheckFn)>,
}

impl ReadinessChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named check. `check` is called once per readiness request.
    pub fn with_check<F, Fut>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        let check: CheckFn =
            Arc::new(move || -> BoxFuture<'static, Result<(), String>> { Box::pin(check()) });
        self.checks.push((name.into(), check));
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check, stopping at the first failure.
    pub async fn run(&self) -> Result<(), ReadinessFailure> {
        for (name, check) in &self.checks {
            if let Err(message) = check().await {
                return Err(ReadinessFailure {
                    check: name.clone(),
                    message,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ReadinessChecks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.checks.iter().map(|(name, _)| name))
            .finish()
    }
}
