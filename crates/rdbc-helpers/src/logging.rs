//! Injectable statement logging
//!
//! Helpers report what they connect to and execute through a
//! [`StatementLogger`]. Each helper is built with the default
//! [`TracingLogger`] or with a logger passed to `with_logger`; there is no
//! process-wide logger instance.
//!
//! Applications that want the log lines on stdout install a subscriber once
//! with [`init`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Target used for all events emitted by [`TracingLogger`]
pub const LOG_TARGET: &str = "rdbc_helpers";

/// Receives leveled text messages from the helpers.
///
/// Implementations must tolerate being shared between threads.
pub trait StatementLogger: Send + Sync {
    /// Record a message at the given level
    fn log(&self, level: Level, message: &str);

    /// Record an info-level message
    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    /// Record a debug-level message
    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }
}

/// Shared logger handle held by every helper
pub type SharedLogger = Arc<dyn StatementLogger>;

/// Forwards messages to `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StatementLogger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: LOG_TARGET, "{}", message),
            Level::WARN => tracing::warn!(target: LOG_TARGET, "{}", message),
            Level::INFO => tracing::info!(target: LOG_TARGET, "{}", message),
            Level::DEBUG => tracing::debug!(target: LOG_TARGET, "{}", message),
            Level::TRACE => tracing::trace!(target: LOG_TARGET, "{}", message),
        }
    }
}

/// Logger used when a helper is built without one
pub fn default_logger() -> SharedLogger {
    Arc::new(TracingLogger)
}

/// Format an elapsed duration the way the helpers log it
pub(crate) fn elapsed_secs(elapsed: Duration) -> String {
    format!("{:.6}", elapsed.as_secs_f64())
}

/// Stdout logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set (e.g. `info`,
    /// `rdbc_helpers=debug`)
    pub level: String,
    /// Include thread ids in each line
    pub thread_ids: bool,
    /// Use ANSI colors
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            thread_ids: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Set the default filter directive
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Include thread ids in each line
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Enable or disable ANSI colors
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }
}

/// Install a stdout `tracing` subscriber for the whole process.
///
/// `RUST_LOG` takes precedence over [`LogConfig::level`]. Fails if a global
/// subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.level))
        .map_err(|e| Error::config(format!("invalid log level '{}': {}", config.level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_thread_ids(config.thread_ids)
                .with_ansi(config.ansi),
        )
        .try_init()
        .map_err(|e| Error::config(format!("logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(Level, String)>>);

    impl StatementLogger for Collect {
        fn log(&self, level: Level, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[test]
    fn test_default_helpers_route_levels() {
        let logger = Collect::default();
        logger.info("a");
        logger.debug("b");
        let lines = logger.0.lock().unwrap();
        assert_eq!(lines[0], (Level::INFO, "a".to_string()));
        assert_eq!(lines[1], (Level::DEBUG, "b".to_string()));
    }

    #[test]
    fn test_log_config_deserialize_defaults() {
        let config: LogConfig = serde_json::from_str(r#"{"thread_ids": true}"#).unwrap();
        assert_eq!(config.level, "info");
        assert!(config.thread_ids);
        assert!(config.ansi);
    }

    #[test]
    fn test_elapsed_secs() {
        assert_eq!(elapsed_secs(Duration::from_millis(1500)), "1.500000");
    }

    #[test]
    fn test_tracing_logger_without_subscriber() {
        TracingLogger.info("no subscriber installed");
    }
}
