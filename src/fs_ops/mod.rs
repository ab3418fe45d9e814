//! Filesystem collaborator.
//!
//! The engine only talks to storage through [`FileSystem`], so a local disk,
//! a network mount or a test double that drops offline on cue are
//! interchangeable. [`LocalFs`] is the real implementation.

mod copy;
pub mod helpers;
mod metadata;

pub use copy::{TEMP_PREFIX, TEMP_SUFFIX, copy_and_rename};
pub use metadata::{preserve_attributes, preserve_times};

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

use crate::availability::exists_on_filesystem;

/// Capability set the transfer engine needs from storage.
pub trait FileSystem: Send + Sync {
    /// Whether `path` currently resolves. Must never fail; errors mean "no".
    fn exists(&self, path: &Path) -> bool;

    /// Regular files under `root`, depth-first. Unreadable entries are skipped.
    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = PathBuf> + 'a>;

    fn size(&self, path: &Path) -> io::Result<u64>;

    /// `mkdir -p`; succeeds if the directory already exists.
    fn make_dirs(&self, path: &Path) -> io::Result<()>;

    /// Fully create or replace `dst` with the bytes of `src`, carrying over
    /// modification time (and access time / permissions where supported).
    fn copy_preserving_metadata(&self, src: &Path, dst: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Open for streaming reads (used by the hasher).
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// Local disk (and anything the OS mounts as one).
#[derive(Debug, Clone)]
pub struct LocalFs {
    /// Carry permissions and xattrs over to the copy. On by default.
    /// Times are always carried over.
    pub preserve_metadata: bool,
}

impl Default for LocalFs {
    fn default() -> Self {
        Self { preserve_metadata: true }
    }
}

impl LocalFs {
    pub fn new(preserve_metadata: bool) -> Self {
        Self { preserve_metadata }
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        exists_on_filesystem(path)
    }

    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        Box::new(
            WalkDir::new(root)
                .min_depth(1)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(e) => Some(e),
                    Err(e) => {
                        trace!(error = %e, "skipping unreadable entry");
                        None
                    }
                })
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path()),
        )
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        fs::metadata(path).map(|m| m.len())
    }

    fn make_dirs(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_preserving_metadata(&self, src: &Path, dst: &Path) -> io::Result<()> {
        copy_and_rename(src, dst)?;
        let meta = fs::metadata(src)?;
        preserve_times(dst, &meta);
        if self.preserve_metadata {
            preserve_attributes(src, dst, &meta);
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(fs::File::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use filetime::FileTime;

    #[test]
    fn walk_lists_nested_files_only() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("b/c.txt").write_str("").unwrap();
        dir.child("empty").create_dir_all().unwrap();

        let fs = LocalFs::default();
        let mut got: Vec<_> = fs
            .walk(dir.path())
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        got.sort();
        assert_eq!(got, vec![PathBuf::from("a.txt"), PathBuf::from("b").join("c.txt")]);
    }

    #[test]
    fn walk_of_missing_root_is_empty() {
        let dir = assert_fs::TempDir::new().unwrap();
        let fs = LocalFs::default();
        assert_eq!(fs.walk(&dir.path().join("gone")).count(), 0);
    }

    #[test]
    fn copy_preserves_mtime_and_replaces_existing() {
        let dir = assert_fs::TempDir::new().unwrap();
        let src = dir.child("src.bin");
        src.write_str("fresh").unwrap();
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(src.path(), old).unwrap();

        let dst = dir.child("out/dst.bin");
        dst.write_str("stale contents").unwrap();

        let fs = LocalFs::new(true);
        fs.copy_preserving_metadata(src.path(), dst.path()).unwrap();

        dst.assert("fresh");
        let meta = std::fs::metadata(dst.path()).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), old);
    }

    #[test]
    fn mtime_is_kept_without_attribute_preservation() {
        let dir = assert_fs::TempDir::new().unwrap();
        let src = dir.child("src.bin");
        src.write_str("data").unwrap();
        let old = FileTime::from_unix_time(1_400_000_000, 0);
        filetime::set_file_mtime(src.path(), old).unwrap();
        let dst = dir.child("dst.bin");

        LocalFs::new(false)
            .copy_preserving_metadata(src.path(), dst.path())
            .unwrap();

        dst.assert("data");
        let meta = std::fs::metadata(dst.path()).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), old);
    }

    #[test]
    fn exists_is_false_for_missing() {
        let dir = assert_fs::TempDir::new().unwrap();
        let fs = LocalFs::default();
        assert!(fs.exists(dir.path()));
        assert!(!fs.exists(&dir.path().join("nope")));
    }
}
