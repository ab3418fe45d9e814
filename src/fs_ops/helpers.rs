//! I/O helper utilities.
//!
//! Enriches io::Error with actionable hints so per-file failures in the log say
//! more than "os error 13".
//!
//! Usage:
//!   fs.copy_preserving_metadata(src, dst).map_err(io_error_with_help("copy", src))?;

use std::io;
use std::path::Path;

use crate::errors::MoveError;

/// Platform-aware hint for a raw OS error code or error kind.
fn hint(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let h = match code {
                libc::EACCES | libc::EPERM => {
                    Some("permission denied; check ownership and write permissions")
                }
                libc::EBUSY => Some("resource busy; ensure no other process is writing"),
                libc::ENOENT => Some("path not found; the device may have been disconnected"),
                libc::ENOSPC => Some("insufficient space on device"),
                libc::EROFS => Some("read-only filesystem; cannot write here"),
                libc::EIO => Some("low-level I/O error; check the device and its cable"),
                libc::ENOTCONN | libc::ESTALE => {
                    Some("network filesystem went away; check the mount")
                }
                libc::ENAMETOOLONG => Some("filename or path too long; shorten path segments"),
                libc::EMFILE => Some("process file descriptor limit reached"),
                _ => None,
            };
            if h.is_some() {
                return h;
            }
        }
        #[cfg(windows)]
        {
            let h = match code {
                5 => Some("access denied; check permissions"),
                32 => Some("sharing violation; file is in use"),
                2 | 3 => Some("path not found; the device may have been disconnected"),
                21 => Some("device not ready"),
                112 => Some("insufficient disk space"),
                19 => Some("write protected / read-only media"),
                206 => Some("filename or path too long (MAX_PATH exceeded)"),
                _ => None,
            };
            if h.is_some() {
                return h;
            }
        }
        let _ = code;
    }

    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            Some("permission denied; check ownership and write permissions")
        }
        io::ErrorKind::NotFound => Some("path not found; the device may have been disconnected"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            Some("busy/timed out; retry after the current write finishes")
        }
        _ => None,
    }
}

/// Rebuild `e` with a hint appended to its message, preserving the ErrorKind.
pub fn with_help(e: io::Error) -> io::Error {
    let Some(h) = hint(&e) else {
        return e;
    };
    let msg = match e.raw_os_error() {
        Some(code) => format!("{e} ({h}) [os code: {code}]"),
        None => format!("{e} ({h})"),
    };
    io::Error::new(e.kind(), msg)
}

/// Adapter for `.map_err(...)` producing a per-file `MoveError::Io`.
pub fn io_error_with_help<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> MoveError + 'a {
    move |e: io::Error| MoveError::Io {
        op,
        path: path.to_path_buf(),
        source: with_help(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn not_found_gets_disconnect_hint() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        let enriched = with_help(e);
        assert_eq!(enriched.kind(), io::ErrorKind::NotFound);
        assert!(enriched.to_string().contains("disconnected"));
    }

    #[test]
    fn unknown_kind_is_left_alone() {
        let e = io::Error::other("weird");
        assert_eq!(with_help(e).to_string(), "weird");
    }

    #[test]
    fn adapter_carries_op_and_path() {
        let err = io_error_with_help("remove source", Path::new("/x/y"))(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "nope",
        ));
        match err {
            MoveError::Io { op, path, source } => {
                assert_eq!(op, "remove source");
                assert_eq!(path, PathBuf::from("/x/y"));
                assert!(source.to_string().contains("permission denied"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stale_mount_hint_does_not_promise_a_wait() {
        let msg = with_help(io::Error::from_raw_os_error(libc::ESTALE)).to_string();
        assert!(msg.contains("check the mount"), "{msg}");
        assert!(!msg.contains("waiting"));
    }
}
