//! One-shot inventory of the source tree.
//! Produces the denominators for progress: file count and total bytes.

use std::path::Path;
use tracing::{debug, trace};

use crate::fs_ops::FileSystem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    pub files: u64,
    pub bytes: u64,
}

/// Walk `root` once, counting files and summing sizes.
/// Entries whose size cannot be read are skipped and do not count.
pub fn scan<F: FileSystem + ?Sized>(fs: &F, root: &Path) -> Inventory {
    let mut inv = Inventory::default();
    for path in fs.walk(root) {
        match fs.size(&path) {
            Ok(len) => {
                inv.files += 1;
                inv.bytes += len;
            }
            Err(e) => trace!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    debug!(root = %root.display(), files = inv.files, bytes = inv.bytes, "Inventory complete");
    inv
}
