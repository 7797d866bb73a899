//! Logging configuration module
//! Console output on stderr plus an optional JSON log file

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,              // trace, debug, info, warn, error
    pub file_path: Option<PathBuf>, // log directory; console only when unset
    pub rotation: LogRotation,
}

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file_path: None,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Initialize logging. Keep the returned guard alive or buffered file output is lost.
    pub fn init(&self) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        // RUST_LOG wins over the configured level
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr);

        let (file_layer, guard) = match self.file_path {
            Some(ref path) => {
                let file_appender = match self.rotation {
                    LogRotation::Hourly => rolling::hourly(path, "podium.log"),
                    LogRotation::Daily => rolling::daily(path, "podium.log"),
                    LogRotation::Never => rolling::never(path, "podium.log"),
                };
                let (writer, guard) = non_blocking(file_appender);

                let layer = fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::debug!("Logging initialized - level: {}", self.level);

        Ok(guard)
    }
}

/// Log a boundary call
#[macro_export]
macro_rules! log_api_request {
    ($method:expr, $path:expr) => {
        tracing::debug!(method = $method, path = $path, "API request")
    };
}

/// Log an operator action against a named resource
#[macro_export]
macro_rules! log_action {
    ($op:expr, $target:expr) => {
        tracing::info!(operation = $op, resource = %$target, "Action")
    };
    ($op:expr, $target:expr, $($key:ident = $value:expr),+) => {
        tracing::info!(
            operation = $op,
            resource = %$target,
            $($key = $value),+,
            "Action"
        )
    };
}
