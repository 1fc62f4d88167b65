//! Change-detection hashing.
//!
//! The accumulator must produce identical values on every platform, so the
//! standard library's randomly seeded hashers are off the table. Strings and
//! byte buffers are first reduced by a BKDR polynomial hash and the result is
//! folded into a running 64-bit value.

use crate::error::Result;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Folds `v` into the running accumulator.
pub fn combine(hash: &mut u64, v: u64) {
    *hash ^= v
        .wrapping_add(0x9E37_79B9)
        .wrapping_add(*hash << 6)
        .wrapping_add(*hash >> 2);
}

/// BKDR polynomial hash (multiplier 131), masked to 31 bits.
fn bkdr(data: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &b in data {
        h = h.wrapping_mul(131).wrapping_add(b as u32);
    }
    h & 0x7FFF_FFFF
}

/// Folds a string into the accumulator.
pub fn hash_string(hash: &mut u64, s: &str) {
    combine(hash, bkdr(s.as_bytes()) as u64);
}

/// Folds a byte buffer into the accumulator.
pub fn hash_data(hash: &mut u64, data: &[u8]) {
    combine(hash, bkdr(data) as u64);
}

/// Folds one file into the accumulator: its contents, or its mtime in whole
/// seconds since the epoch when `check_time` is set.
pub fn hash_file(hash: &mut u64, path: &Path, check_time: bool) -> Result<()> {
    if check_time {
        let modified = fs::metadata(path)?.modified()?;
        let secs = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        combine(hash, secs);
    } else {
        let bytes = fs::read(path)?;
        hash_data(hash, &bytes);
    }
    Ok(())
}

/// Folds every `.png` under `root` into the accumulator.
///
/// Traversal is sorted by file name at each level so identical trees hash
/// identically regardless of the filesystem's enumeration order.
pub fn hash_files(hash: &mut u64, root: &Path, check_time: bool) -> Result<()> {
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "png") {
            hash_file(hash, path, check_time)?;
        }
    }
    Ok(())
}

/// Reads a previously stored hash; `None` when the file is missing or does
/// not parse as a decimal integer.
pub fn load_hash(path: &Path) -> Option<u64> {
    let text = fs::read_to_string(path).ok()?;
    text.trim().parse().ok()
}

/// Writes the hash as decimal text.
pub fn save_hash(path: &Path, hash: u64) -> Result<()> {
    fs::write(path, hash.to_string())?;
    Ok(())
}
