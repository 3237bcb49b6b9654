//! Logging for Requisite
//!
//! Every crate in the workspace logs through the `tracing` macros re-exported
//! here. Hosts without a subscriber of their own can install one with
//! [`LogConfig`]: by default it admits the workspace crates at INFO, other
//! crates at WARN, and writes JSON lines to STDOUT.
//!
//! ```no_run
//! use requisite_core::logging::*;
//!
//! let _guard = LogConfig::new()
//!     .format(LogFormat::Pretty)
//!     .target("requisite_validation", LogLevel::Trace)
//!     .try_init()
//!     .expect("no subscriber installed yet");
//!
//! info!("requirements mounted");
//! ```

use crate::Error;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::{debug, error, info, trace, warn};

/// Targets admitted at the configured level
pub const WORKSPACE_TARGETS: [&str; 2] = ["requisite_core", "requisite_validation"];

/// Level applied to every other target
const OTHER_TARGETS_LEVEL: LogLevel = LogLevel::Warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    Plain,
    /// Multi-line, for development
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Daily-rotated files `{directory}/{prefix}.YYYY-MM-DD`
    DailyFile { directory: PathBuf, prefix: String },
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Per-target levels, applied after the workspace defaults
    pub targets: Vec<(String, LogLevel)>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Set the level of one target, e.g. `("requisite_validation", Trace)`
    pub fn target(mut self, target: impl Into<String>, level: LogLevel) -> Self {
        let target = target.into();
        self.targets.retain(|(existing, _)| *existing != target);
        self.targets.push((target, level));
        self
    }

    /// Filter used when `RUST_LOG` is unset
    pub fn directives(&self) -> String {
        let defaults = WORKSPACE_TARGETS
            .iter()
            .filter(|target| !self.targets.iter().any(|(t, _)| t == *target))
            .map(|target| format!("{target}={}", self.level.as_str()));
        let overrides = self
            .targets
            .iter()
            .map(|(target, level)| format!("{target}={}", level.as_str()));

        std::iter::once(OTHER_TARGETS_LEVEL.as_str().to_string())
            .chain(defaults)
            .chain(overrides)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Install the global subscriber.
    ///
    /// Fails if one is already installed. Keep the returned guard alive;
    /// buffered events are flushed when it drops.
    pub fn try_init(self) -> Result<WorkerGuard, Error> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.directives()))
            .map_err(|e| Error::Internal(format!("invalid log filter: {e}")))?;

        let (writer, guard) = match &self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogOutput::DailyFile { directory, prefix } => {
                tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, prefix))
            }
        };

        let registry = tracing_subscriber::registry().with(filter);
        let installed = match self.format {
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(writer))
                .try_init(),
            LogFormat::Plain => registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init(),
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(writer))
                .try_init(),
        };
        installed.map_err(|e| Error::Internal(format!("log subscriber not installed: {e}")))?;

        Ok(guard)
    }
}
