// hasher.rs — SHA-256 helpers.
//
// Hashes are lowercase hex. They are used for raw action fingerprints,
// audit chain links, and the gate's configuration digest.

use sha2::{Digest, Sha256};

/// SHA-256 of arbitrary bytes, hex-encoded.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of a UTF-8 string, hex-encoded.
pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}

/// SHA-256 over several parts, each length-prefixed so that
/// `["ab", "c"]` and `["a", "bc"]` hash differently.
pub fn hash_parts(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
