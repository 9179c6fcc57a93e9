//! In-memory continuity-token store for replayable thinking blocks
//!
//! A thought signature certifies that a thinking block may be replayed to
//! the target model without re-deriving it. The response path records
//! (model, thinking text) → token as signatures stream back; the request
//! path looks tokens up again and validates client-supplied ones. Entries
//! are TTL- and capacity-bounded.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

use std::time::Duration;

use mini_moka::sync::Cache;
use sha2::{Digest, Sha256};

/// Tuning for a [`SignatureStore`]
#[derive(Debug, Clone)]
pub struct SignatureStoreConfig {
    /// How long a recorded signature stays usable
    pub ttl: Duration,
    /// Maximum number of entries per internal cache
    pub capacity: u64,
    /// Tokens shorter than this are ignored on record
    pub min_token_len: usize,
}

impl Default for SignatureStoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(2 * 60 * 60),
            capacity: 1000,
            min_token_len: 50,
        }
    }
}

/// Shared store of thought-signature continuity tokens
///
/// Create once at service startup and share across request handlers. All
/// operations are non-blocking; lookups are deterministic for a given store
/// state.
#[derive(Clone)]
pub struct SignatureStore {
    by_text: Cache<String, String>,
    known: Cache<String, ()>,
    min_token_len: usize,
}

impl SignatureStore {
    /// Create a store with the given tuning
    pub fn new(config: &SignatureStoreConfig) -> Self {
        Self {
            by_text: Cache::builder()
                .max_capacity(config.capacity)
                .time_to_live(config.ttl)
                .build(),
            known: Cache::builder()
                .max_capacity(config.capacity)
                .time_to_live(config.ttl)
                .build(),
            min_token_len: config.min_token_len,
        }
    }

    /// Record a signature observed for a thinking block
    ///
    /// Called by the response path. Suspiciously short tokens are ignored.
    pub fn record(&self, model: &str, thinking_text: &str, token: &str) {
        if token.len() < self.min_token_len {
            tracing::debug!(model, "ignoring short thought signature");
            return;
        }
        self.by_text.insert(text_key(model, thinking_text), token.to_owned());
        self.known.insert(token_key(model, token), ());
    }

    /// Look up the signature previously recorded for a thinking text
    pub fn lookup(&self, model: &str, thinking_text: &str) -> Option<String> {
        self.by_text.get(&text_key(model, thinking_text))
    }

    /// Whether a token is a known, still-live signature for this model
    ///
    /// An empty token is always invalid.
    pub fn validate(&self, model: &str, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.known.get(&token_key(model, token)).is_some()
    }

    /// Drop every recorded signature (tests)
    pub fn clear(&self) {
        self.by_text.invalidate_all();
        self.known.invalidate_all();
    }
}

impl Default for SignatureStore {
    fn default() -> Self {
        Self::new(&SignatureStoreConfig::default())
    }
}

impl std::fmt::Debug for SignatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureStore").finish_non_exhaustive()
    }
}

/// Thinking texts can be large, so they are keyed by digest
fn text_key(model: &str, thinking_text: &str) -> String {
    let digest = Sha256::digest(thinking_text.as_bytes());
    format!("{model}\u{0}{digest:x}")
}

fn token_key(model: &str, token: &str) -> String {
    format!("{model}\u{0}{token}")
}
