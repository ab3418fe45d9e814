//! Shared transfer counters.
//!
//! The engine is the only writer and the reporter the only reader. One mutex
//! guards the whole record so a frame never shows `moved_bytes` from one file
//! next to `moved_files` from the previous one. Critical sections are counter
//! updates only; no I/O happens under the lock.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Consistent copy of all counters, taken under the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub total_files: u64,
    pub total_bytes: u64,
    pub moved_files: u64,
    pub moved_bytes: u64,
    pub current_file: String,
    pub current_file_size: u64,
    pub active: bool,
}

/// A snapshot plus the rate window since the previous sample.
#[derive(Debug, Clone)]
pub struct Sample {
    pub snapshot: Snapshot,
    /// Time since the run started.
    pub elapsed: Duration,
    /// Time since the previous sample (or run start for the first one).
    pub window: Duration,
    pub window_bytes: u64,
    pub window_files: u64,
}

#[derive(Debug)]
struct Inner {
    totals_set: bool,
    total_files: u64,
    total_bytes: u64,
    moved_files: u64,
    moved_bytes: u64,
    current_file: String,
    current_file_size: u64,
    active: bool,
    started: Instant,
    last_sample_at: Instant,
    last_moved_bytes: u64,
    last_moved_files: u64,
}

#[derive(Debug)]
pub struct ProgressState {
    inner: Mutex<Inner>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressState {
    /// New, active record; the run clock starts now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(started: Instant) -> Self {
        Self {
            inner: Mutex::new(Inner {
                totals_set: false,
                total_files: 0,
                total_bytes: 0,
                moved_files: 0,
                moved_bytes: 0,
                current_file: String::new(),
                current_file_size: 0,
                active: true,
                started,
                last_sample_at: started,
                last_moved_bytes: 0,
                last_moved_files: 0,
            }),
        }
    }

    // A panic elsewhere cannot leave the counters half-written, so a poisoned
    // lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Record inventory totals. Only the first call takes effect.
    pub fn set_totals(&self, files: u64, bytes: u64) -> bool {
        let mut g = self.lock();
        if g.totals_set {
            return false;
        }
        g.totals_set = true;
        g.total_files = g.total_files.max(files);
        g.total_bytes = g.total_bytes.max(bytes);
        true
    }

    /// Mark `name` (relative path) as the file in flight.
    pub fn announce(&self, name: &str, size: u64) {
        let mut g = self.lock();
        g.current_file.clear();
        g.current_file.push_str(name);
        g.current_file_size = size;
    }

    /// Count one verified, source-deleted file of `bytes` bytes.
    pub fn commit(&self, bytes: u64) {
        let mut g = self.lock();
        g.moved_files += 1;
        g.moved_bytes += bytes;
        // The tree can grow after inventory; widen rather than overshoot.
        let widened = g.moved_files > g.total_files || g.moved_bytes > g.total_bytes;
        g.total_files = g.total_files.max(g.moved_files);
        g.total_bytes = g.total_bytes.max(g.moved_bytes);
        drop(g);
        if widened {
            debug!("source tree grew since inventory; widened progress totals");
        }
    }

    /// Clear the active flag; the reporter exits after its next frame.
    pub fn finish(&self) {
        self.lock().active = false;
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn snapshot(&self) -> Snapshot {
        let g = self.lock();
        Self::snapshot_of(&g)
    }

    fn snapshot_of(g: &Inner) -> Snapshot {
        Snapshot {
            total_files: g.total_files,
            total_bytes: g.total_bytes,
            moved_files: g.moved_files,
            moved_bytes: g.moved_bytes,
            current_file: g.current_file.clone(),
            current_file_size: g.current_file_size,
            active: g.active,
        }
    }

    /// Take a snapshot and advance the rate window.
    pub fn sample(&self) -> Sample {
        self.sample_at(Instant::now())
    }

    pub fn sample_at(&self, now: Instant) -> Sample {
        let mut g = self.lock();
        let elapsed = now.saturating_duration_since(g.started);
        let window = now.saturating_duration_since(g.last_sample_at);
        let window_bytes = g.moved_bytes - g.last_moved_bytes;
        let window_files = g.moved_files - g.last_moved_files;
        g.last_moved_bytes = g.moved_bytes;
        g.last_moved_files = g.moved_files;
        g.last_sample_at = now;
        Sample {
            snapshot: Self::snapshot_of(&g),
            elapsed,
            window,
            window_bytes,
            window_files,
        }
    }
}
