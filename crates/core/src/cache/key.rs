//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Deterministic digest of a rule-ID set.
///
/// IDs are sorted first, so the fingerprint is independent of registry
/// order; any change to the active set produces a different fingerprint.
pub fn rule_fingerprint(rule_ids: &[&str]) -> String {
    let mut ids = rule_ids.to_vec();
    ids.sort_unstable();
    let mut hasher = Sha256::new();
    hasher.update(ids.join(",").as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the cache key for a document's content under an active rule set.
///
/// Keyed on the content bytes, not the source URI: two URIs serving
/// identical content share one entry. Collisions are accepted at
/// cryptographic-hash probability; no detection is performed.
pub fn cache_key(content: &str, rule_ids: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(b"\n");
    hasher.update(rule_fingerprint(rule_ids).as_bytes());
    hex::encode(hasher.finalize())
}
