//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the content address of a request inside a store.
///
/// The method is hashed as given; callers pass it upper-cased.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
