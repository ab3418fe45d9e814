//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Usage errors exit with status 1 (clap's own default is 2).

use clap::{Parser, ValueHint};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::types::{Config, LogLevel};

/// Move a directory tree, verifying every file before deleting its source.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Move a directory tree with per-file SHA-256 verification"
)]
pub struct Args {
    /// Directory tree to move from.
    #[arg(value_name = "SOURCE", value_hint = ValueHint::DirPath)]
    pub source: PathBuf,

    /// Directory to move into. Must exist; waited for while missing.
    #[arg(value_name = "DESTINATION", value_hint = ValueHint::DirPath)]
    pub destination: PathBuf,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, value_parser = parse_log_level, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Never redraw in place; print a one-line snapshot periodically instead.
    #[arg(long)]
    pub plain: bool,

    /// Dry-run: log what would move but do not modify the filesystem.
    #[arg(
        long,
        help = "Show what would be moved, but do not modify files/directories"
    )]
    pub dry_run: bool,

    /// Seconds between availability checks while a root is missing.
    #[arg(long, value_name = "SECS")]
    pub retry_secs: Option<u64>,

    /// Seconds to pause after a file fails before trying the next one.
    #[arg(long, value_name = "SECS")]
    pub backoff_secs: Option<u64>,
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    s.parse()
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        cfg.source = self.source.clone();
        cfg.destination = self.destination.clone();
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if let Some(secs) = self.retry_secs {
            cfg.retry_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.backoff_secs {
            cfg.failure_backoff = Duration::from_secs(secs);
        }
    }
}

/// Parse the process arguments. On a usage error clap's message is printed
/// and the process exits with status 1; `--help`/`--version` exit 0.
pub fn parse() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    }
}
