//! Typed error definitions for verify_move.
//! Provides a small set of well-known failure modes for better logs and tests.
//!
//! Only `Usage` and `Config` are fatal to a run. Everything raised inside the
//! per-file state machine is logged and the engine moves on to the next file.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::hasher::Digest;

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("{0}")]
    Usage(String),

    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Path is not available: {0}")]
    Unavailable(PathBuf),

    #[error("{op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Hash mismatch for {path}: source {source_digest}, destination {dest_digest}")]
    VerificationMismatch {
        path: PathBuf,
        source_digest: Digest,
        dest_digest: Digest,
    },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl MoveError {
    /// Stable numeric code used as a structured log field.
    pub fn code(&self) -> u16 {
        match self {
            MoveError::Usage(_) => 1,
            MoveError::Config { .. } => 2,
            MoveError::Unavailable(_) => 3,
            MoveError::Io { .. } => 4,
            MoveError::VerificationMismatch { .. } => 5,
            MoveError::Interrupted => 130,
        }
    }

    /// Short machine-friendly name, logged next to `code`.
    pub fn kind(&self) -> &'static str {
        match self {
            MoveError::Usage(_) => "usage",
            MoveError::Config { .. } => "config",
            MoveError::Unavailable(_) => "unavailable",
            MoveError::Io { .. } => "io",
            MoveError::VerificationMismatch { .. } => "hash_mismatch",
            MoveError::Interrupted => "interrupted",
        }
    }
}
