//! Handle to a running server.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::lifecycle::shutdown::{Shutdown, ShutdownOutcome};
use crate::lifecycle::startup::LifecycleError;
use crate::lifecycle::state::{LifecycleState, LifecycleTracker};

/// The active listening endpoint.
///
/// Returned by the start operation and consumed by [`ServerHandle::shutdown`]
/// or [`ServerHandle::stopped`].
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    cutoff: Shutdown,
    lifecycle: LifecycleTracker,
    drain_timeout: Option<Duration>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown: Shutdown,
        cutoff: Shutdown,
        lifecycle: LifecycleTracker,
        drain_timeout: Option<Duration>,
        task: JoinHandle<std::io::Result<()>>,
    ) -> Self {
        Self {
            local_addr,
            shutdown,
            cutoff,
            lifecycle,
            drain_timeout,
            task,
        }
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    /// Subscribe to lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    /// A trigger that starts the graceful shutdown when fired, e.g. from a
    /// signal handler.
    pub fn shutdown_trigger(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) -> Result<ShutdownOutcome, LifecycleError> {
        self.shutdown.trigger();
        self.stopped().await
    }

    /// Wait until the server stops.
    ///
    /// Does not trigger shutdown itself. The drain timeout starts counting
    /// when the shutdown trigger fires. When it elapses, handlers still
    /// running are cancelled and answer 503, the serving task is aborted and
    /// `TimedOut` is returned. Those 503 responses may still be in flight on
    /// their connections when this returns.
    pub async fn stopped(self) -> Result<ShutdownOutcome, LifecycleError> {
        let ServerHandle {
            shutdown,
            cutoff,
            lifecycle,
            drain_timeout,
            mut task,
            ..
        } = self;

        tokio::select! {
            res = &mut task => return finish(res),
            _ = shutdown.wait() => {}
        }

        let Some(limit) = drain_timeout else {
            return finish(task.await);
        };

        match tokio::time::timeout(limit, &mut task).await {
            Ok(res) => finish(res),
            Err(_) => {
                cutoff.trigger();
                task.abort();
                lifecycle.advance(LifecycleState::Stopped);
                tracing::warn!(
                    timeout_secs = limit.as_secs_f64(),
                    "Drain timeout elapsed, cancelling in-flight requests"
                );
                Ok(ShutdownOutcome::TimedOut)
            }
        }
    }
}

fn finish(res: Result<std::io::Result<()>, JoinError>) -> Result<ShutdownOutcome, LifecycleError> {
    match res {
        Ok(Ok(())) => {
            tracing::info!("Server closed");
            Ok(ShutdownOutcome::Drained)
        }
        Ok(Err(e)) => Err(LifecycleError::Serve(e)),
        Err(e) => Err(LifecycleError::Task(e.to_string())),
    }
}
