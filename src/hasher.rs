//! Streaming SHA-256 content digests.
//!
//! Files are read in fixed 8 KiB chunks so memory use does not depend on file
//! size. The same digest is used for the pre-copy resume check and for
//! post-copy verification.

use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::errors::MoveError;
use crate::fs_ops::helpers::io_error_with_help;

/// Read size for each digest update.
pub const CHUNK_SIZE: usize = 8192;

/// Lowercase hex encoding of a SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest everything `reader` yields until EOF.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<Digest> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Digest(format!("{:x}", hasher.finalize())))
}

/// Digest a file on the local filesystem.
pub fn digest_file(path: &Path) -> Result<Digest, MoveError> {
    let file = File::open(path).map_err(io_error_with_help("open for hashing", path))?;
    digest_reader(file).map_err(io_error_with_help("read for hashing", path))
}
