//! Fingerprint digest.

use md5::{Digest, Md5};

/// Digest a fingerprint string into 32 lowercase hex characters.
///
/// MD5 is the JA3 convention, which lets operators paste published JA3
/// hashes straight into policy lists.
pub fn digest(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}
