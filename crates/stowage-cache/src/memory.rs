//! In-process [`CacheStore`] for development and tests.
//!
//! Entries live in a sharded [`DashMap`] and expire lazily: an expired entry
//! is treated as a miss and removed the next time it is read. Wildcard
//! deletes scan the whole map.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::store::{CacheError, CacheStore, split_pattern};

#[derive(Debug, Clone)]
struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Cache store kept in process memory. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| !e.is_expired(Instant::now()))
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, CacheError> {
        let now = Instant::now();

        // Drop the read guard before removing, or the shard lock deadlocks.
        let found = self.entries.get(key).map(|e| e.value().clone());

        match found {
            Some(entry) if entry.is_expired(now) => {
                self.entries.remove_if(key, |_, e| e.is_expired(now));
                Err(CacheError::Miss)
            }
            Some(entry) => Ok(entry.value),
            None => Err(CacheError::Miss),
        }
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }

    async fn delete_wildcard(&self, pattern: &str) -> Result<u64, CacheError> {
        let (prefix, is_prefix) = split_pattern(pattern);

        if !is_prefix {
            return Ok(self.entries.remove(prefix).map_or(0, |_| 1));
        }

        let mut removed: u64 = 0;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store
            .set("/v1/product/1", payload("{\"id\":1}"), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("/v1/product/1").await.unwrap(), payload("{\"id\":1}"));
        assert!(store.get("/v1/product/2").await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let store = MemoryStore::new();
        store
            .set("/v1/product/1", payload("x"), Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(store.get("/v1/product/1").await.unwrap_err().is_miss());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_zero_ttl_never_expires() {
        let store = MemoryStore::new();
        store.set("k", payload("v"), Duration::ZERO).await.unwrap();
        assert!(store.contains_key("k"));
    }

    #[tokio::test]
    async fn test_delete_wildcard_removes_prefix_only() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        store.set("/v1/product/1", payload("a"), ttl).await.unwrap();
        store.set("/v1/product?sort=price", payload("b"), ttl).await.unwrap();
        store.set("/v1/brand/1", payload("c"), ttl).await.unwrap();

        let removed = store.delete_wildcard("/v1/product*").await.unwrap();

        assert_eq!(removed, 2);
        assert!(!store.contains_key("/v1/product/1"));
        assert!(store.contains_key("/v1/brand/1"));
    }

    #[tokio::test]
    async fn test_delete_wildcard_on_empty_family_is_noop() {
        let store = MemoryStore::new();
        assert_eq!(store.delete_wildcard("/v1/product*").await.unwrap(), 0);
        assert_eq!(store.delete_wildcard("/v1/product*").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_exact_keys() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        store.set("a", payload("1"), ttl).await.unwrap();
        store.set("b", payload("2"), ttl).await.unwrap();

        store.delete(&["a".to_string()]).await.unwrap();
        store.delete(&[]).await.unwrap();

        assert!(!store.contains_key("a"));
        assert!(store.contains_key("b"));
        assert_eq!(store.delete_wildcard("b").await.unwrap(), 1);
    }
}
