//! OS signal handling.
//!
//! SIGTERM and SIGINT both start a graceful shutdown. A second signal while
//! draining exits the process immediately with status 1.
//!
//! Handlers are registered by [`install`] before it returns, so a signal
//! that arrives while the listener is still binding is not lost.

use std::future::Future;

use tokio::signal;
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// A termination request received from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("SIGINT"),
            Signal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Something that yields termination signals. `None` means no more will come.
pub trait SignalSource: Send + 'static {
    fn recv(&mut self) -> impl Future<Output = Option<Signal>> + Send;
}

/// Registered SIGINT/SIGTERM listeners.
#[derive(Debug)]
pub struct Signals {
    #[cfg(unix)]
    interrupt: signal::unix::Signal,
    #[cfg(unix)]
    terminate: signal::unix::Signal,
}

impl Signals {
    /// Register the handlers. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn register() -> std::io::Result<Self> {
        use signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }
}

#[cfg(unix)]
impl SignalSource for Signals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(Signal::Interrupt),
            Some(()) = self.terminate.recv() => Some(Signal::Terminate),
            else => None,
        }
    }
}

#[cfg(not(unix))]
impl SignalSource for Signals {
    async fn recv(&mut self) -> Option<Signal> {
        signal::ctrl_c().await.ok().map(|()| Signal::Interrupt)
    }
}

/// Turn the first signal into a shutdown trigger and the second into
/// `force_exit(1)`.
pub async fn forward<S, F>(mut signals: S, shutdown: Shutdown, force_exit: F)
where
    S: SignalSource,
    F: FnOnce(i32),
{
    let Some(signal) = signals.recv().await else {
        return;
    };
    tracing::info!(signal = %signal, "Shutdown signal received, shutting down gracefully");
    shutdown.trigger();

    if let Some(signal) = signals.recv().await {
        tracing::warn!(signal = %signal, "Second shutdown signal received, forcing exit");
        force_exit(1);
    }
}

/// Register the OS handlers, then spawn the task forwarding them to `shutdown`.
pub fn install(shutdown: Shutdown) -> std::io::Result<JoinHandle<()>> {
    let signals = Signals::register()?;
    Ok(tokio::spawn(forward(signals, shutdown, |code| {
        std::process::exit(code)
    })))
}
