//! Logging setup utilities for the Parlor chat relay.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Binary names use `-` while tracing targets use `_`, so the binary name is
/// normalised the same way cargo normalises crate names.
pub fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={level},{}={level},tower_http={level}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        binary_name.replace('-', "_"),
        level = default_log_level,
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "parlor-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use parlor_shared::logger::setup_logger;
///
/// setup_logger("parlor-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
