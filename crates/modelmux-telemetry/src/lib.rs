//! Logging setup for modelmux
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a fmt
//! layer that writes either human-readable text or JSON lines to stderr.

use modelmux_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;

/// Initialize logging from configuration
///
/// `RUST_LOG`, when set, takes precedence over `telemetry.log_filter`.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = build_filter(config)?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(config: &TelemetryConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(directives) = std::env::var(EnvFilter::DEFAULT_ENV)
        && !directives.trim().is_empty()
    {
        return EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("invalid {} directive '{directives}': {e}", EnvFilter::DEFAULT_ENV));
    }

    EnvFilter::try_new(&config.log_filter)
        .map_err(|e| anyhow::anyhow!("invalid telemetry.log_filter '{}': {e}", config.log_filter))
}
