//! Logging utilities and configuration for eda-guard.
//!
//! Diagnostics go through `tracing`. [`EventLog`] additionally keeps the
//! semicolon-separated run log that operators read after a batch run.

use crate::prelude::*;
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

/// Logging configuration for the validation run.
///
/// Controls how much per-check detail is emitted and how long logged values
/// may get.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for eda-guard components
    pub base_level: Level,
    /// Whether to log per-check resolution and outcome details
    pub log_check_details: bool,
    /// Whether to log data source operations
    pub log_data_operations: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_check_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_check_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for unattended runs.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_check_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }
}

/// Debug logging that only runs when the configured level allows it.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Per-check logging, enabled by [`LogConfig::log_check_details`].
#[macro_export]
macro_rules! log_check {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_check_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Data source logging, enabled by [`LogConfig::log_data_operations`].
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Severity column of an [`EventLog`] line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Fail,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Fail => "fail",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header line written once at the top of every event log file.
pub const EVENT_LOG_HEADER: &str = "timestamp;location;occurrence;detail;severity";

/// Append-only run log with one `timestamp;location;occurrence;detail;severity`
/// line per event.
///
/// Each event is also emitted as a `tracing` event at the matching level.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl EventLog {
    /// Creates `<dir>/<YYYYmmdd HH-MM-SS> eda.log`, creating `dir` if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
        let name = format!("{} eda.log", Local::now().format("%Y%m%d %H-%M-%S"));
        Self::open(dir.join(name))
    }

    /// Opens (or creates) the log at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening event log {}", path.display()))?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{EVENT_LOG_HEADER}")?;
        }
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one event.
    pub fn record(
        &self,
        location: &str,
        occurrence: &str,
        detail: &str,
        severity: Severity,
    ) -> Result<()> {
        match severity {
            Severity::Info => {
                tracing::info!(event.location = %location, event.detail = %detail, "{occurrence}")
            }
            Severity::Warning | Severity::Fail => {
                tracing::warn!(event.location = %location, event.detail = %detail, "{occurrence}")
            }
            Severity::Error => {
                tracing::error!(event.location = %location, event.detail = %detail, "{occurrence}")
            }
        }

        let line = format!(
            "{};{};{};{};{}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            cell(location),
            cell(occurrence),
            cell(detail),
            severity
        );
        let mut file = self
            .file
            .lock()
            .map_err(|_| EdaError::Internal("event log lock poisoned".to_string()))?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    pub fn info(&self, location: &str, occurrence: &str, detail: &str) -> Result<()> {
        self.record(location, occurrence, detail, Severity::Info)
    }

    pub fn warning(&self, location: &str, occurrence: &str, detail: &str) -> Result<()> {
        self.record(location, occurrence, detail, Severity::Warning)
    }

    pub fn fail(&self, location: &str, occurrence: &str, detail: &str) -> Result<()> {
        self.record(location, occurrence, detail, Severity::Fail)
    }

    pub fn error(&self, location: &str, occurrence: &str, detail: &str) -> Result<()> {
        self.record(location, occurrence, detail, Severity::Error)
    }
}

// Keeps one event per line and the column count fixed.
fn cell(text: &str) -> String {
    text.replace(';', ",").replace(['\r', '\n'], " ")
}

/// Utilities for setting up structured logging.
pub mod setup {
    use tracing::Level;

    /// Configuration for the `tracing` subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for dependencies
        pub level: Level,
        /// Log level for eda-guard components specifically
        pub eda_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                eda_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, warnings from dependencies, info from eda-guard.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                eda_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                eda_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn structured() -> Self {
            Self {
                level: Level::INFO,
                eda_level: Level::DEBUG,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_eda_level(mut self, level: Level) -> Self {
            self.eda_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            match self.env_filter {
                Some(ref filter) => filter.clone(),
                None => format!(
                    "{},eda_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.eda_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs the global subscriber. `RUST_LOG` overrides the configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use eda_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
