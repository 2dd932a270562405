//! Structured logging.
//!
//! JSON lines in production, human-readable output elsewhere. `RUST_LOG`
//! overrides the configured level entirely.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ServiceConfig};

/// Default filter directives for a log level.
pub fn default_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("backend_api={level},tower_http={level}")
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &ServiceConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.observability.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    match config.observability.resolved_format(&config.environment) {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_crate_and_middleware() {
        assert_eq!(default_directives("DEBUG"), "backend_api=debug,tower_http=debug");
    }
}
