//! Content hashing for `.hash` sidecar files.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// SHA-256 of `data` as upper-case hex, the format sidecar files hold.
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02X}");
    }
    out
}

/// Compare a sidecar's content against a hash, ignoring surrounding
/// whitespace and case.
#[must_use]
pub fn hash_matches(sidecar: &str, hash: &str) -> bool {
    sidecar.trim().eq_ignore_ascii_case(hash)
}
