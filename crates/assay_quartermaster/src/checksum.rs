//! SHA-512 file checksums for package and tool archives.

use sha2::{Digest, Sha512};
use std::fs::File;
use std::io;
use std::path::Path;

/// Compute the SHA-512 checksum of a file as lowercase hex.
pub fn file_checksum_sha512(path: impl AsRef<Path>) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha512::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Stored checksums vary in case depending on which service wrote them.
pub fn checksums_match(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}
