//! Bounded, content-hash-keyed cache for normalized schemas
//!
//! Read-mostly: the same tool schemas repeat across requests, so hits vastly
//! outnumber insertions. Eviction is deliberately simple — when full, drop
//! entries in sorted-key order until half remain — trading hit-rate
//! optimality for predictability.

use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Default maximum number of cached schemas
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cache occupancy snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently cached
    pub entries: usize,
    /// Configured capacity
    pub capacity: usize,
}

/// Concurrent map from schema content hash to normalized schema text
pub struct SchemaCache {
    entries: DashMap<String, String>,
    capacity: usize,
}

impl SchemaCache {
    /// Create a cache bounded to `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }

    /// Look up a normalized schema by content hash
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store a normalized schema, evicting half the entries when full
    pub fn insert(&self, key: String, value: String) {
        if self.entries.len() >= self.capacity {
            self.evict_half();
        }
        self.entries.insert(key, value);
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Current occupancy and capacity
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
        }
    }

    fn evict_half(&self) {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort_unstable();

        let to_remove = keys.len() / 2;
        for key in keys.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }
        tracing::debug!(evicted = to_remove, "schema cache evicted half its entries");
    }
}

/// Hex-encoded SHA-256 of the raw schema text
///
/// Keyed on exact text, so textually-different renderings of the same
/// schema are cached independently.
pub fn content_hash(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    format!("{hash:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(content_hash("{}"), content_hash("{}"));
        assert_ne!(content_hash("{}"), content_hash("{ }"));
    }

    #[test]
    fn get_returns_inserted_value() {
        let cache = SchemaCache::new(8);
        cache.insert("k1".to_owned(), "v1".to_owned());
        assert_eq!(cache.get("k1").as_deref(), Some("v1"));
        assert!(cache.get("k2").is_none());
    }

    #[test]
    fn eviction_keeps_half_in_sorted_key_order() {
        let cache = SchemaCache::new(4);
        for key in ["a", "b", "c", "d"] {
            cache.insert(key.to_owned(), key.to_owned());
        }
        // Cache is at capacity: the next insert first evicts "a" and "b"
        cache.insert("e".to_owned(), "e".to_owned());

        assert_eq!(cache.stats().entries, 3);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        assert!(cache.get("d").is_some());
        assert!(cache.get("e").is_some());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = SchemaCache::new(8);
        cache.insert("k".to_owned(), "v".to_owned());
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
