//! Core configuration types.
//! - Config holds runtime settings with defaults matching the mover's constants.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::availability::DEFAULT_RETRY_INTERVAL;
use crate::engine::DEFAULT_FAILURE_BACKOFF;
use crate::progress::reporter::{DEFAULT_PLAIN_EVERY, DEFAULT_TICK};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for one move.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tree to move from
    pub source: PathBuf,
    /// Tree to move into
    pub destination: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Pause between availability checks
    pub retry_interval: Duration,
    /// Pause after a file fails
    pub failure_backoff: Duration,
    /// Progress redraw period
    pub tick_interval: Duration,
    /// Period of one-line snapshots on a non-interactive console
    pub plain_every: Duration,
    /// Carry permissions and xattrs over to the copy (times are always kept)
    pub preserve_metadata: bool,
    /// Log what would move, change nothing
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            log_level: LogLevel::Normal,
            log_file: None,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
            tick_interval: DEFAULT_TICK,
            plain_every: DEFAULT_PLAIN_EVERY,
            preserve_metadata: true,
            dry_run: false,
        }
    }
}

impl Config {
    /// Construct a Config for `source` -> `destination`; other fields use defaults.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Default::default()
        }
    }
}
