//! Content verification for copy fallbacks.
//!
//! When a rename cannot be used, the source is only deleted once the
//! destination hashes to the same BLAKE3 digest.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

/// Compute the BLAKE3 digest of a file, streaming it in fixed-size chunks.
pub fn file_digest(path: &Path) -> io::Result<blake3::Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// True if both files have identical contents.
pub fn same_contents(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(file_digest(a)? == file_digest(b)?)
}
