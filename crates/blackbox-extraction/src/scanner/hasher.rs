//! Source hashing via xxh3.

use blackbox_core::constants::SOURCE_HASH_LEN;
use xxhash_rust::xxh3::xxh3_64;

/// Compute the xxh3 64-bit hash of arbitrary content.
#[inline]
pub fn hash_content(content: &[u8]) -> u64 {
    xxh3_64(content)
}

/// Short hex digest identifying a project across scans.
pub fn source_hash(source_id: &str) -> String {
    let mut hex = format!("{:016x}", hash_content(source_id.as_bytes()));
    hex.truncate(SOURCE_HASH_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_sized() {
        let hash = source_hash("acme-org");
        assert_eq!(hash, source_hash("acme-org"));
        assert_eq!(hash.len(), SOURCE_HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_projects_differ() {
        assert_ne!(source_hash("acme-org"), source_hash("globex-org"));
    }
}
