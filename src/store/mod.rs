//! In-Memory Key-Value Store
//!
//! A synchronized string map with last-write-wins semantics. Mutated by two
//! producers (direct client writes on the leader, replicated applies on a
//! follower) and read by client GETs; no cross-key atomicity, no versioning,
//! no I/O failure modes.

use std::collections::HashMap;
use std::sync::RwLock;

/// Internally synchronized in-memory key-value map.
#[derive(Debug, Default)]
pub struct KvStore {
    map: RwLock<HashMap<String, String>>,
}

impl KvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key.
    pub fn put(&self, key: &str, value: &str) {
        let mut map = self.map.write().unwrap();
        map.insert(key.to_string(), value.to_string());
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<String> {
        let map = self.map.read().unwrap();
        map.get(key).cloned()
    }

    /// Remove a key. Returns whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        let mut map = self.map.write().unwrap();
        map.remove(key).is_some()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.map.read().unwrap().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
