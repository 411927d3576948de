//! Tracing subscriber setup.
//!
//! Installs a global `tracing-subscriber` registry with an `EnvFilter` and
//! either a human-readable or a JSON fmt layer, driven by [`QueryConfig`].

use crate::config::QueryConfig;
use crate::errors::TelemetryError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the log filter: `RUST_LOG` if set, else the configured level.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] for an unparseable directive.
pub fn build_filter(config: &QueryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] for a bad filter,
/// [`TelemetryError::AlreadyInitialized`] if a global subscriber exists.
pub fn init_tracing(config: &QueryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    }

    tracing::info!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        gas_limit = config.contract_query_gas_limit,
        vm_pool_size = config.vm_pool_size,
        "Contract query tracing initialized"
    );

    Ok(())
}
