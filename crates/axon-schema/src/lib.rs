//! JSON Schema normalization for the Antigravity function-calling dialect
//!
//! Upstream tool declarations arrive with arbitrary JSON Schema fragments;
//! the target API accepts a much narrower dialect. [`SchemaNormalizer`]
//! rewrites a schema in a single recursive pass (union flattening, nullable
//! extraction, constraint demotion, placeholder injection) and memoizes the
//! result in a bounded, content-hash-keyed cache.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod cache;
mod normalize;

pub use cache::{CacheStats, SchemaCache};

use serde_json::Value;

/// Single-pass JSON Schema rewriter with a shared memoization cache
///
/// Construct once at service startup and share across request handlers;
/// normalization itself is pure, so the cache is only an accelerator and
/// never a source of truth.
pub struct SchemaNormalizer {
    cache: SchemaCache,
}

impl SchemaNormalizer {
    /// Create a normalizer with the default cache capacity
    pub fn new() -> Self {
        Self {
            cache: SchemaCache::new(cache::DEFAULT_CAPACITY),
        }
    }

    /// Create a normalizer with an explicit cache capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: SchemaCache::new(capacity),
        }
    }

    /// Rewrite a raw JSON Schema string into the restricted target dialect
    ///
    /// Fail-open: input that does not parse as JSON is returned unchanged,
    /// so callers must tolerate the original text echoing back.
    pub fn normalize(&self, schema_text: &str) -> String {
        let key = cache::content_hash(schema_text);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("schema cache hit");
            return cached;
        }

        let Ok(mut tree) = serde_json::from_str::<Value>(schema_text) else {
            tracing::debug!("schema is not valid JSON, returning unchanged");
            return schema_text.to_owned();
        };

        normalize::normalize_tree(&mut tree);

        match serde_json::to_string(&tree) {
            Ok(normalized) => {
                self.cache.insert(key, normalized.clone());
                normalized
            }
            Err(_) => schema_text.to_owned(),
        }
    }

    /// Drop every cached entry (tests and operational tooling)
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Current cache occupancy and capacity
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_is_returned_unchanged() {
        let normalizer = SchemaNormalizer::new();
        assert_eq!(normalizer.normalize("not json {"), "not json {");
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = SchemaNormalizer::new();
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "mode": {"type": "string", "enum": ["read", "write"]},
                "count": {"type": "integer", "minimum": 0, "maxItems": 5},
                "payload": {
                    "anyOf": [
                        {"type": "object", "properties": {"data": {"type": "string"}}},
                        {"type": "null"}
                    ]
                }
            },
            "required": ["mode"]
        })
        .to_string();

        let once = normalizer.normalize(&schema);
        let twice = normalizer.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn result_is_identical_with_and_without_cache() {
        let normalizer = SchemaNormalizer::new();
        let schema = r#"{"type":"object","properties":{"a":{"type":["string","null"]}},"required":["a"]}"#;

        let first = normalizer.normalize(schema);
        normalizer.clear_cache();
        let second = normalizer.normalize(schema);
        // Third call is served from the cache
        let third = normalizer.normalize(schema);

        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn cache_stats_reflect_usage() {
        let normalizer = SchemaNormalizer::with_capacity(16);
        assert_eq!(normalizer.cache_stats().entries, 0);

        normalizer.normalize(r#"{"type":"object"}"#);
        normalizer.normalize(r#"{"type":"string"}"#);
        let stats = normalizer.cache_stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.capacity, 16);

        normalizer.clear_cache();
        assert_eq!(normalizer.cache_stats().entries, 0);
    }
}
