//! Metadata preservation.
//! - `preserve_times`: atime and mtime, applied to every copy.
//! - `preserve_attributes`: permissions (mode on Unix, readonly on Windows) and
//!   extended attributes when built with the `xattrs` feature. Optional.
//! - Best-effort: failures are logged and ignored. The content digest is the
//!   integrity check; a lost timestamp never fails a move.

use filetime::{FileTime, set_file_times};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Copy access and modification times from `src_meta` onto `dest`.
pub fn preserve_times(dest: &Path, src_meta: &fs::Metadata) {
    let mt = FileTime::from_last_modification_time(src_meta);
    let at = FileTime::from_last_access_time(src_meta);
    if let Err(e) = set_file_times(dest, at, mt) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }
}

/// Copy permissions and extended attributes from `src` onto `dest`.
pub fn preserve_attributes(src: &Path, dest: &Path, src_meta: &fs::Metadata) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let src_mode = src_meta.permissions().mode() & 0o777;
        let perms = fs::Permissions::from_mode(src_mode);
        if let Err(e) = fs::set_permissions(dest, perms) {
            warn!(path = %dest.display(), mode = format!("{:o}", src_mode), error = %e, "failed to set permissions on destination");
        }
    }

    // Windows: mirror the readonly attribute
    #[cfg(windows)]
    {
        if let Ok(meta) = fs::metadata(dest) {
            let mut perms = meta.permissions();
            perms.set_readonly(src_meta.permissions().readonly());
            if let Err(e) = fs::set_permissions(dest, perms) {
                warn!(path = %dest.display(), error = %e, "failed to set readonly attribute on destination");
            }
        }
    }

    preserve_xattrs(src, dest);
}

#[cfg(feature = "xattrs")]
fn preserve_xattrs(src: &Path, dest: &Path) {
    let names = match xattr::list(src) {
        Ok(names) => names,
        Err(e) => {
            warn!(src = %src.display(), error = %e, "failed to list xattrs; continuing");
            return;
        }
    };
    for name in names {
        let name_disp = name.to_string_lossy().into_owned();
        match xattr::get(src, &name) {
            Ok(value) => {
                let value = value.unwrap_or_default();
                if let Err(e) = xattr::set(dest, &name, &value) {
                    warn!(dest = %dest.display(), xattr = %name_disp, error = %e, "failed to set xattr on destination");
                }
            }
            Err(e) => {
                warn!(src = %src.display(), xattr = %name_disp, error = %e, "failed to read xattr from source");
            }
        }
    }
}

#[cfg(not(feature = "xattrs"))]
fn preserve_xattrs(_src: &Path, _dest: &Path) {}
