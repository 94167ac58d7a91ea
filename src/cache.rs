//! In-memory TTL cache keyed by request URL.
//!
//! The cache stores raw JSON payloads with their capture instant. Entries
//! never expire on their own: a `get` is a hit only while the entry's age is
//! under the TTL supplied by the *caller*, so the same entry can be fresh
//! for one resource class and stale for another. There is no eviction
//! beyond overwrite on re-fetch, and no in-flight deduplication: two
//! near-simultaneous misses for one key both go to the network and the
//! later write wins.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached payload for `key` iff its age is under `ttl`.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<Value> {
        let entries = self.entries.lock().unwrap();
        let (payload, captured_at) = entries.get(key)?;
        if captured_at.elapsed() < ttl {
            Some(payload.clone())
        } else {
            None
        }
    }

    /// Stores `payload` under `key`, stamped with the current instant.
    pub fn put(&self, key: &str, payload: Value) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (payload, Instant::now()));
    }

    /// Number of distinct keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
