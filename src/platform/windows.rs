//! Windows implementations of platform helpers (best-effort).
//!
//! Windows lacks POSIX mode semantics; we do not attempt ACL management here.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Directory fsync is not available through std on Windows; renames are
/// flushed by the filesystem.
pub fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
