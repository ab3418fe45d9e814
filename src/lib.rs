//! Core library for `verify_move`.
//!
//! Moves a directory tree file by file: copy, verify by SHA-256, then delete
//! the source. Missing roots (unplugged disks, dropped mounts) are waited
//! out rather than treated as failures, and a background reporter shows
//! live progress from a mutex-guarded [`ProgressState`].

pub mod availability;
pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod fs_ops;
pub mod hasher;
pub mod inventory;
pub mod logging;
pub mod output;
pub mod platform;
pub mod progress;
pub mod shutdown;

pub use availability::AvailabilityGate;
pub use config::{Config, LogLevel};
pub use engine::{FileOutcome, FileRecord, FileState, RunSummary, TransferEngine, TransferJob};
pub use errors::MoveError;
pub use fs_ops::{FileSystem, LocalFs};
pub use hasher::{Digest, digest_file, digest_reader};
pub use inventory::{Inventory, scan};
pub use progress::{ProgressState, Reporter};
