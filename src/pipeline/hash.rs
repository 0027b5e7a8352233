// src/pipeline/hash.rs

use std::io::Read;
use std::path::Path;

use blake3::Hasher;

use crate::errors::{AssetpipeError, Result};
use crate::fs::FileSystem;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs.open_read(path).map_err(|e| AssetpipeError::io(path, e))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| AssetpipeError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Hash in-memory contents the same way [`compute_file_hash`] hashes a file.
pub fn compute_bytes_hash(contents: &[u8]) -> String {
    blake3::hash(contents).to_hex().to_string()
}
