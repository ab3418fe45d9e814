//! Config validation.
//! Roots may be offline at startup (the availability gate waits for them), so
//! only path relationships are checked here, not existence.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::types::Config;
use crate::errors::MoveError;

/// Resolve symlinks through the deepest existing ancestor; the missing tail
/// (an offline mount, a directory not created yet) is appended as given.
fn real(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(c) = fs::canonicalize(existing) {
            let mut out = dunce::simplified(&c).to_path_buf();
            out.extend(rest.iter().rev());
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

impl Config {
    /// Reject empty roots, identical roots and a destination inside the source.
    pub fn validate(&self) -> Result<(), MoveError> {
        let src = &self.source;
        let dst = &self.destination;
        if src.as_os_str().is_empty() || dst.as_os_str().is_empty() {
            return Err(MoveError::Usage(
                "both SOURCE and DESTINATION are required".into(),
            ));
        }

        let src_real = real(src);
        let dst_real = real(dst);
        if src_real == dst_real {
            return Err(MoveError::Usage(format!(
                "source and destination resolve to the same path: '{}'",
                src_real.display()
            )));
        }
        if dst_real.starts_with(&src_real) {
            return Err(MoveError::Usage(format!(
                "destination '{}' must not be inside source '{}'",
                dst_real.display(),
                src_real.display()
            )));
        }

        info!(
            "Config validated: source='{}' destination='{}' log_file='{}'",
            src.display(),
            dst.display(),
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into())
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_same_and_nested_roots() {
        let td = tempfile::tempdir().unwrap();
        let src = td.path().join("src");
        fs::create_dir(&src).unwrap();

        let same = Config::new(&src, &src);
        assert!(matches!(same.validate(), Err(MoveError::Usage(_))));

        let nested = Config::new(&src, src.join("inner"));
        assert!(matches!(nested.validate(), Err(MoveError::Usage(_))));
    }

    #[test]
    fn accepts_siblings_even_when_offline() {
        let td = tempfile::tempdir().unwrap();
        let cfg = Config::new(td.path().join("usb/photos"), td.path().join("nas/photos"));
        cfg.validate().unwrap();
    }

    #[test]
    fn destination_may_contain_source() {
        let td = tempfile::tempdir().unwrap();
        let cfg = Config::new(td.path().join("archive/incoming"), td.path().join("archive"));
        cfg.validate().unwrap();
    }
}
