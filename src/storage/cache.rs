// src/storage/cache.rs

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;
use sha2::{Digest, Sha256};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded map whose entries expire after a fixed TTL. At capacity the
/// oldest entry is evicted first. Expiry is lazy: checked on access and
/// on insert.
pub struct TtlMap<V> {
    entries: HashMap<String, Entry<V>>,
    ttl: Duration,
    maxsize: usize,
}

impl<V> TtlMap<V> {
    pub fn new(ttl: Duration, maxsize: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            maxsize: maxsize.max(1),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&V> {
        if self.is_expired(key) {
            self.entries.remove(key);
        }
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        if self.is_expired(key) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key).map(|e| &mut e.value)
    }

    pub fn insert(&mut self, key: String, value: V) {
        self.purge_expired();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.maxsize {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.inserted_at.elapsed() > self.ttl)
    }

    fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.inserted_at.elapsed() <= ttl);
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.inserted_at)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

/// Content-addressed memoization store for collaborator responses.
/// Keys are a stable hash of a canonicalized JSON payload.
pub struct ResponseCache {
    inner: Mutex<TtlMap<Value>>,
}

impl ResponseCache {
    pub fn new(ttl_s: u64, maxsize: usize) -> Self {
        Self {
            inner: Mutex::new(TtlMap::new(Duration::from_secs(ttl_s), maxsize)),
        }
    }

    /// `prefix:sha256(payload)`. Object keys serialize in sorted order, so
    /// logically equal payloads always hash alike.
    pub fn key(prefix: &str, payload: &Value) -> String {
        let raw = payload.to_string();
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        format!("{}:{:x}", prefix, hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: Value) {
        self.inner.lock().unwrap().insert(key.to_string(), value);
    }
}
