//! Logging setup for the Bisik binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose log output is enabled by default.
const WORKSPACE_CRATES: [&str; 2] = ["bisik_shared", "bisik_server"];

/// HTTP request spans from `tower_http::trace`.
const HTTP_TRACE_DIRECTIVE: &str = "tower_http=debug";

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Every workspace crate and the binary itself log at `default_log_level`;
/// HTTP request traces are always included. A binary that is itself a
/// workspace crate is listed once.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary = binary_name.replace('-', "_");
    let extra = (!WORKSPACE_CRATES.contains(&binary.as_str())).then_some(binary);
    WORKSPACE_CRATES
        .iter()
        .map(|target| target.to_string())
        .chain(extra)
        .map(|target| format!("{}={}", target, default_log_level))
        .chain(std::iter::once(HTTP_TRACE_DIRECTIVE.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "bisik-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use bisik_shared::logger::setup_logger;
///
/// setup_logger("bisik-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
