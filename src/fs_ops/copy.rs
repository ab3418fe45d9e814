//! Safe copy-and-rename helper:
//! - Streams src into a temp file in the destination directory
//! - Fsyncs the temp file before it becomes visible
//! - Renames temp -> dest, replacing any stale destination
//! - Fsyncs the destination directory (Unix)
//!
//! A reader of `dest` therefore sees either the old file or the complete new
//! one, never a torn copy. A failed copy removes its own temp. Temps left by a
//! crash are not swept: a user file can carry the same name.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::platform::fsync_dir;

pub const TEMP_PREFIX: &str = ".verify_move.";
pub const TEMP_SUFFIX: &str = ".tmp";

const BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers

fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!("{TEMP_PREFIX}{pid}.{nanos}{TEMP_SUFFIX}"))
}

/// Stream `src` into a new file at `tmp`, then fsync it.
fn copy_streaming(src: &Path, tmp: &Path) -> io::Result<u64> {
    let reader = File::open(src)?;
    let out = OpenOptions::new().write(true).create_new(true).open(tmp)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, reader);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, out);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

/// Copy `src` over `dest` via a temp sibling and a rename.
pub fn copy_and_rename(src: &Path, dest: &Path) -> io::Result<()> {
    let dest_dir = dest.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("destination has no parent: {}", dest.display()),
        )
    })?;
    let tmp = unique_temp_path(dest_dir);

    if let Err(e) = copy_streaming(src, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    // Windows: clear the way first; older rename semantics refuse to overwrite.
    #[cfg(windows)]
    {
        if let Err(e) = fs::remove_file(dest) {
            if e.kind() != io::ErrorKind::NotFound {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
        }
    }

    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    // Ignore fsync errors to avoid turning a successful rename into a failure.
    let _ = fsync_dir(dest_dir);
    Ok(())
}
