//! Logging configuration for mapkv
//!
//! Application-level bootstrap for the `tracing` framework used across
//! the engine crates. The store itself only emits events; initializing a
//! subscriber is the embedding application's choice.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter
    pub level: String,
    /// Optional log file; stdout is used when absent
    pub file: Option<std::path::PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Create config with info level and stdout output
    pub fn info() -> Self {
        Self::default()
    }

    /// Create config with debug level
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Create config with warn level
    pub fn warn() -> Self {
        Self {
            level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Set log output to a file with daily rotation
    pub fn with_file<P: Into<std::path::PathBuf>>(mut self, path: P) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Initialize global logging with this configuration
    ///
    /// Returns a guard that must be kept alive for file logging to work.
    /// When the guard is dropped, the logging worker thread is shutdown.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use mapkv::logging::LogConfig;
    ///
    /// // Keep the guard alive for the lifetime of your application
    /// let _guard = LogConfig::info().init();
    /// ```
    pub fn init(self) -> Option<WorkerGuard> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .expect("Invalid log level");

        match self.file {
            None => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer())
                    .init();
                None
            }
            Some(path) => {
                let file_appender = tracing_appender::rolling::daily(
                    path.parent().unwrap_or_else(|| std::path::Path::new(".")),
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("mapkv.log"),
                );
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(non_blocking))
                    .init();

                Some(guard)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.file.is_none());
    }

    #[test]
    fn test_log_config_builders() {
        let config = LogConfig::debug().with_file("/tmp/test.log");
        assert_eq!(config.level, "debug");
        assert!(config.file.is_some());

        let config = LogConfig::warn().with_level("trace");
        assert_eq!(config.level, "trace");
    }
}
