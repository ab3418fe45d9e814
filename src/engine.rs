//! Verified move engine.
//!
//! Walks the source tree one file at a time and drives each file through
//! gate -> announce -> resume check -> copy -> verify -> delete -> commit.
//! A source copy is only removed after the destination digest matched the
//! source digest in this run. Per-file failures are logged and the walk goes
//! on; only a shutdown request ends it early.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

use crate::availability::AvailabilityGate;
use crate::errors::MoveError;
use crate::fs_ops::FileSystem;
use crate::fs_ops::helpers::io_error_with_help;
use crate::hasher::{Digest, digest_reader};
use crate::inventory::Inventory;
use crate::progress::ProgressState;
use crate::shutdown;

/// Default pause after a failed file before the next one is tried.
pub const DEFAULT_FAILURE_BACKOFF: Duration = Duration::from_secs(5);

/// One run's roots and inventory totals. Fixed once the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub total_files: u64,
    pub total_bytes: u64,
}

impl TransferJob {
    pub fn new(source: PathBuf, destination: PathBuf, inventory: Inventory) -> Self {
        Self {
            source,
            destination,
            total_files: inventory.files,
            total_bytes: inventory.bytes,
        }
    }

    /// Path of `source_file` relative to the source root.
    fn relative<'p>(&self, source_file: &'p Path) -> &'p Path {
        source_file.strip_prefix(&self.source).unwrap_or(source_file)
    }
}

/// Per-file working record. Digests are computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub size: u64,
}

impl FileRecord {
    pub fn resolve(job: &TransferJob, source: PathBuf, size: u64) -> Self {
        let relative = job.relative(&source).to_path_buf();
        let destination = job.destination.join(&relative);
        Self {
            relative,
            source,
            destination,
            size,
        }
    }

    fn name(&self) -> String {
        self.relative.display().to_string()
    }
}

/// Where a file is in its move. Logged with failures to show the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Gating,
    Announcing,
    ResumeChecking,
    Copying,
    Verifying,
    Deleting,
    Committed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Copied, verified, source deleted, counted.
    Moved,
    /// Destination already identical; nothing done, not counted.
    AlreadyPresent,
    /// Copy did not verify; source kept.
    Mismatch,
    Failed,
    /// Dry run: would have been copied.
    WouldMove,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub moved: u64,
    pub already_present: u64,
    pub mismatched: u64,
    pub failed: u64,
    pub would_move: u64,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Moved => self.moved += 1,
            FileOutcome::AlreadyPresent => self.already_present += 1,
            FileOutcome::Mismatch => self.mismatched += 1,
            FileOutcome::Failed => self.failed += 1,
            FileOutcome::WouldMove => self.would_move += 1,
        }
    }

    pub fn had_failures(&self) -> bool {
        self.mismatched > 0 || self.failed > 0
    }
}

pub struct TransferEngine<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    progress: &'a ProgressState,
    gate: AvailabilityGate,
    failure_backoff: Duration,
    dry_run: bool,
}

impl<'a, F: FileSystem + ?Sized> TransferEngine<'a, F> {
    pub fn new(fs: &'a F, progress: &'a ProgressState) -> Self {
        Self {
            fs,
            progress,
            gate: AvailabilityGate::default(),
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
            dry_run: false,
        }
    }

    pub fn gate(mut self, gate: AvailabilityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn failure_backoff(mut self, backoff: Duration) -> Self {
        self.failure_backoff = backoff;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Move every file under `job.source`. Does not clear the progress
    /// active flag; the caller does that once the run is over.
    pub fn run(&self, job: &TransferJob) -> RunSummary {
        let mut summary = RunSummary::default();
        for source in self.fs.walk(&job.source) {
            if shutdown::is_requested() {
                summary.interrupted = true;
                break;
            }
            match self.process(job, source) {
                Ok(outcome) => summary.record(outcome),
                Err(_) => {
                    summary.interrupted = true;
                    break;
                }
            }
        }
        if summary.interrupted {
            warn!("Shutdown requested; stopped at a file boundary");
        }
        summary
    }

    /// Run one file to an outcome. Only `Interrupted` escapes as an error.
    fn process(&self, job: &TransferJob, source: PathBuf) -> Result<FileOutcome, MoveError> {
        let relative = job.relative(&source).to_path_buf();
        let mut state = FileState::Gating;
        let err = match self.move_file(job, source, &mut state) {
            Ok(outcome) => return Ok(outcome),
            Err(MoveError::Interrupted) => return Err(MoveError::Interrupted),
            Err(e) => e,
        };

        let stage = state;
        state = FileState::Failed;
        trace!(path = %relative.display(), ?state, "file abandoned");

        if let MoveError::VerificationMismatch {
            source_digest,
            dest_digest,
            ..
        } = &err
        {
            error!(
                path = %relative.display(),
                code = err.code(),
                kind = err.kind(),
                source_digest = %source_digest,
                dest_digest = %dest_digest,
                "hash mismatch; source kept"
            );
            return Ok(FileOutcome::Mismatch);
        }

        error!(
            path = %relative.display(),
            code = err.code(),
            kind = err.kind(),
            stage = ?stage,
            error = %err,
            "Failed to move file"
        );
        // A shutdown during the backoff is picked up at the next file boundary.
        let _ = shutdown::sleep(self.failure_backoff);
        Ok(FileOutcome::Failed)
    }

    fn move_file(
        &self,
        job: &TransferJob,
        source: PathBuf,
        state: &mut FileState,
    ) -> Result<FileOutcome, MoveError> {
        *state = FileState::Gating;
        self.gate.wait_until_available(self.fs, &job.source)?;
        self.gate.wait_until_available(self.fs, &job.destination)?;

        *state = FileState::Announcing;
        let size = self
            .fs
            .size(&source)
            .map_err(io_error_with_help("stat source", &source))?;
        let rec = FileRecord::resolve(job, source, size);
        self.progress.announce(&rec.name(), rec.size);

        if !self.dry_run
            && let Some(parent) = rec.destination.parent()
        {
            self.fs
                .make_dirs(parent)
                .map_err(io_error_with_help("create directory", parent))?;
        }

        *state = FileState::ResumeChecking;
        if self.already_present(&rec)? {
            debug!(path = %rec.relative.display(), "already present at destination; skipping");
            return Ok(FileOutcome::AlreadyPresent);
        }

        if self.dry_run {
            info!(path = %rec.relative.display(), bytes = rec.size, "would move");
            return Ok(FileOutcome::WouldMove);
        }

        *state = FileState::Copying;
        self.fs
            .copy_preserving_metadata(&rec.source, &rec.destination)
            .map_err(io_error_with_help("copy", &rec.source))?;

        *state = FileState::Verifying;
        let source_digest = self.digest(&rec.source)?;
        let dest_digest = self.digest(&rec.destination)?;
        if source_digest != dest_digest {
            return Err(MoveError::VerificationMismatch {
                path: rec.relative.clone(),
                source_digest,
                dest_digest,
            });
        }

        *state = FileState::Deleting;
        self.fs
            .remove(&rec.source)
            .map_err(io_error_with_help("remove source", &rec.source))?;

        *state = FileState::Committed;
        self.progress.commit(rec.size);
        debug!(path = %rec.relative.display(), bytes = rec.size, "moved");
        Ok(FileOutcome::Moved)
    }

    /// Destination exists with the same size and the same digest.
    fn already_present(&self, rec: &FileRecord) -> Result<bool, MoveError> {
        if !self.fs.exists(&rec.destination) {
            return Ok(false);
        }
        let dest_size = self
            .fs
            .size(&rec.destination)
            .map_err(io_error_with_help("stat destination", &rec.destination))?;
        if dest_size != rec.size {
            return Ok(false);
        }
        Ok(self.digest(&rec.source)? == self.digest(&rec.destination)?)
    }

    fn digest(&self, path: &Path) -> Result<Digest, MoveError> {
        let reader = self
            .fs
            .open(path)
            .map_err(io_error_with_help("open for hashing", path))?;
        digest_reader(reader).map_err(io_error_with_help("read for hashing", path))
    }
}
