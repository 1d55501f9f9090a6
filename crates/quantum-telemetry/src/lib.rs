//! Structured logging setup for the consensus core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quantum_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("failed to init logging");
//!
//!     // Your application code here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level or `EnvFilter` directives |
//! | `QC_SERVICE_NAME` | `quantum-chain` | Service name attached to log lines |
//! | `QC_JSON_LOGS` | `false` | Emit JSON rather than human-readable logs |

#![warn(missing_docs)]
#![allow(missing_docs)]

mod config;

pub use config::TelemetryConfig;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The configured log level / `EnvFilter` directive string didn't parse.
    #[error("invalid log level filter: {0}")]
    Config(String),

    /// A global subscriber was already installed (e.g. by a test harness).
    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Initialize structured logging from `config`.
///
/// Returns a guard; nothing needs to happen on drop today (there is no
/// exporter to flush), but callers hold it for the lifetime of the process
/// the same way they would hold a flushing guard, so a future exporter can be
/// added without changing call sites.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

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
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(config.console_output);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    tracing::info!(service = %config.service_name, "logging initialized");

    Ok(TelemetryGuard)
}

/// Held for the lifetime of the process; dropping it is a no-op today.
pub struct TelemetryGuard;
