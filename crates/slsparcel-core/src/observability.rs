//! Observability: tracing init.
//!
//! Uses config::ObservabilityConfig for SLSPARCEL_QUIET, LOG_LEVEL, LOG_JSON.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Tracing initialization mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingMode {
    /// Default: use SLSPARCEL_LOG_LEVEL / SLSPARCEL_QUIET from env
    Default,
    /// `--verbose`: debug for every slsparcel crate, including bundler argv
    Verbose,
}

/// Initialize tracing. Call at process startup.
/// When SLSPARCEL_QUIET=1, only WARN and above are logged.
pub fn init_tracing(mode: TracingMode) {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = match mode {
        TracingMode::Verbose => "slsparcel=debug,slsparcel_core=debug,slsparcel_fs=debug,slsparcel_bundler=debug,slsparcel_plugin=debug".to_string(),
        TracingMode::Default if cfg.quiet => "warn".to_string(),
        TracingMode::Default => default_filter(&cfg.log_level),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

/// `slsparcel=info` also covers the library crates, whose targets are
/// `slsparcel_*`.
fn default_filter(log_level: &str) -> String {
    if log_level.contains(',') || !log_level.starts_with("slsparcel=") {
        return log_level.to_string();
    }
    let level = &log_level["slsparcel=".len()..];
    format!(
        "slsparcel={l},slsparcel_core={l},slsparcel_fs={l},slsparcel_bundler={l},slsparcel_plugin={l}",
        l = level
    )
}
