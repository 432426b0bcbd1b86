//! Redis-backed [`CacheStore`].
//!
//! Payloads are stored as raw bytes under the cache key itself, so keys stay
//! readable with `redis-cli` (`KEYS /v1/product*`).

use async_trait::async_trait;
use bytes::Bytes;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::RedisConfig;
use crate::store::{CacheError, CacheStore, split_pattern};

/// Number of keys requested per `SCAN` round trip.
const SCAN_BATCH: usize = 100;

/// Redis cache store with a self-reconnecting connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to Redis and verifies the connection with `PING`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL is invalid or the server
    /// does not answer.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let mut conn = ConnectionManager::new(client).await?;

        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Connected to Redis");

        Ok(Self { conn })
    }

    /// Connects using discrete host/port/password/database settings.
    pub async fn from_config(config: &RedisConfig) -> Result<Self, CacheError> {
        Self::connect(&config.url()).await
    }
}

/// Escapes Redis glob metacharacters so `literal` only matches itself.
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl CacheStore for RedisStore {
    #[instrument(skip(self, value), fields(cache.operation = "SET"))]
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        if ttl.is_zero() {
            conn.set::<_, _, ()>(key, &value[..]).await?;
        } else {
            // PX keeps sub-second TTLs intact; never round down to zero.
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            conn.pset_ex::<_, _, ()>(key, &value[..], millis).await?;
        }

        debug!(cache.key = %key, cache.ttl_ms = %ttl.as_millis(), cache.bytes = value.len(), "Cache set");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Bytes, CacheError> {
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<Vec<u8>>>(key).await? {
            Some(value) => Ok(Bytes::from(value)),
            None => Err(CacheError::Miss),
        }
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(keys).await?;

        debug!(cache.keys = keys.len(), "Cache keys deleted");

        Ok(())
    }

    /// Walks the keyspace with `SCAN` rather than `KEYS` so large keyspaces
    /// do not block the server. Cost is still proportional to the number of
    /// keys in the database.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    async fn delete_wildcard(&self, pattern: &str) -> Result<u64, CacheError> {
        let (prefix, is_prefix) = split_pattern(pattern);
        let mut match_pattern = escape_glob(prefix);
        if is_prefix {
            match_pattern.push('*');
        }

        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&match_pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");

        Ok(deleted)
    }
}
