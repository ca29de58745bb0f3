//! Optional `tracing` subscriber setup.
//!
//! The library only emits `tracing` events (node construction and observation
//! at `debug`, message and mask routing at `trace`). Applications that do not
//! install their own subscriber can enable the `structured-logging` feature and
//! call [`init_logging`]:
//!
//! ```toml
//! [dependencies]
//! tensorlogic-vmp = { version = "0.1", features = ["structured-logging"] }
//! ```
//!
//! ```no_run
//! use tensorlogic_vmp::logging::{init_logging, LogFormat};
//!
//! init_logging(LogFormat::Compact, "tensorlogic_vmp=debug").unwrap();
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Result, VmpError};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (for development).
    Pretty,
    /// Compact format without colors.
    Compact,
    /// JSON lines (for log aggregation).
    Json,
}

/// Install a global subscriber.
///
/// `filter` uses `EnvFilter` syntax; `RUST_LOG` takes precedence when set.
/// Fails if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| VmpError::InvalidConfig(format!("invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().with_ansi(false).compact())
            .try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    installed.map_err(|e| VmpError::InvalidConfig(format!("failed to initialize tracing: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        // Only meaningful when RUST_LOG does not override the filter
        if std::env::var("RUST_LOG").is_err() {
            assert!(init_logging(LogFormat::Compact, "tensorlogic_vmp=loudest").is_err());
        }
    }
}
