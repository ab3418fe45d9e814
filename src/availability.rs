//! Availability gate.
//!
//! Removable and network storage comes and goes. Instead of failing, the mover
//! parks until the path resolves again, checking every `interval`. There is
//! no timeout; a Ctrl-C is the only way out.

use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::MoveError;
use crate::fs_ops::FileSystem;
use crate::shutdown;

/// Default pause between availability checks.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Existence probe that never fails: any error reads as "not available".
pub fn exists_on_filesystem(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

#[derive(Debug, Clone, Copy)]
pub struct AvailabilityGate {
    interval: Duration,
}

impl Default for AvailabilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_INTERVAL)
    }
}

impl AvailabilityGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until `fs.exists(path)`. Returns `Interrupted` only on shutdown.
    pub fn wait_until_available<F: FileSystem + ?Sized>(
        &self,
        fs: &F,
        path: &Path,
    ) -> Result<(), MoveError> {
        let mut waited = false;
        loop {
            if shutdown::is_requested() {
                return Err(MoveError::Interrupted);
            }
            if fs.exists(path) {
                if waited {
                    info!(path = %path.display(), "Path is available again");
                }
                return Ok(());
            }
            warn!(path = %path.display(), "Waiting for {} to become available...", path.display());
            waited = true;
            if !shutdown::sleep(self.interval) {
                return Err(MoveError::Interrupted);
            }
        }
    }
}
