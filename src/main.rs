//! Backend API service.
//!
//! Loads configuration, binds the configured port and serves until SIGTERM
//! or SIGINT, then drains in-flight requests and exits.
//!
//! Exit status is 0 after a clean drain and 1 on any startup failure or
//! when draining exceeds `shutdown.drain_timeout_secs`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use backend_api::config::load_config;
use backend_api::lifecycle::signals;
use backend_api::observability::{logging, metrics};
use backend_api::{HttpServer, Shutdown, ShutdownOutcome};

#[derive(Parser)]
#[command(name = "backend-api", version, about = "Backend API service")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is not up yet, so configuration errors go to stderr.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "backend-api starting");
    tracing::info!(
        port = config.listener.port,
        environment = %config.environment,
        request_timeout_secs = config.timeouts.request_secs,
        drain_timeout_secs = config.shutdown.drain_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Handlers go in before the listener binds so no signal is missed.
    let shutdown = Shutdown::new();
    if let Err(e) = signals::install(shutdown.clone()) {
        tracing::error!(error = %e, "Failed to install signal handlers");
        return ExitCode::FAILURE;
    }

    let environment = config.environment.clone();
    let handle = match HttpServer::new(config).with_shutdown(shutdown).start().await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        address = %handle.local_addr(),
        "Backend API running on port {}",
        handle.local_addr().port()
    );
    tracing::info!("Environment: {}", environment);

    match handle.stopped().await {
        Ok(ShutdownOutcome::Drained) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Ok(ShutdownOutcome::TimedOut) => {
            tracing::warn!("Shutdown forced after drain timeout");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Server terminated with an error");
            ExitCode::FAILURE
        }
    }
}
