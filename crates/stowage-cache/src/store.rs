//! Storage contract consumed by the response cache.
//!
//! The middleware never talks to a backend directly; it goes through
//! [`CacheStore`], which keeps it independent of Redis and lets tests swap in
//! [`MemoryStore`](crate::MemoryStore) or a failing store.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Cache miss")]
    Miss,

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    /// Whether this error only means the key was absent or expired.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss)
    }
}

/// Key-value store holding cached response payloads.
///
/// Payloads are opaque bytes. Implementations must be safe to call from many
/// requests concurrently.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stores `value` under `key`, expiring after `ttl`.
    ///
    /// A zero `ttl` stores the value without expiry.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    /// Fetches the payload stored under `key`.
    ///
    /// Returns [`CacheError::Miss`] when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Bytes, CacheError>;

    /// Deletes the given keys. Deleting nothing is a no-op.
    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;

    /// Deletes every key matching `pattern` and returns how many were removed.
    ///
    /// Only a trailing `*` is a wildcard: `"/v1/product*"` removes all keys
    /// starting with `/v1/product`. A pattern without `*` matches one key
    /// exactly.
    async fn delete_wildcard(&self, pattern: &str) -> Result<u64, CacheError>;
}

/// Splits a wildcard pattern into its literal prefix and whether it is a
/// prefix match.
pub(crate) fn split_pattern(pattern: &str) -> (&str, bool) {
    match pattern.strip_suffix('*') {
        Some(prefix) => (prefix, true),
        None => (pattern, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pattern() {
        assert_eq!(split_pattern("/v1/product*"), ("/v1/product", true));
        assert_eq!(split_pattern("/v1/product/1"), ("/v1/product/1", false));
        assert_eq!(split_pattern("*"), ("", true));
    }

    #[test]
    fn test_is_miss() {
        assert!(CacheError::Miss.is_miss());
        assert!(!CacheError::Unavailable("down".into()).is_miss());
    }
}
