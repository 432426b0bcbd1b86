//! # Stowage Cache
//!
//! Response caching for versioned JSON APIs served by axum.
//!
//! This crate provides:
//! - Cache key and resource family derivation ([`keys`])
//! - The [`CacheStore`] contract with Redis and in-process implementations
//! - Cache configuration from environment variables
//! - The response caching middleware ([`response_cache`]), including
//!   group-based invalidation on mutating requests
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{Router, middleware};
//! use stowage_cache::{CacheConfig, RedisConfig, RedisStore, ResponseCache, response_cache};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = RedisStore::from_config(&RedisConfig::from_env()).await.unwrap();
//!     let cache = ResponseCache::new(Arc::new(store), CacheConfig::from_env());
//!
//!     let api = Router::new()
//!         // ... routes under /v1 ...
//!         .layer(middleware::from_fn_with_state(cache, response_cache));
//! }
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod middleware;
pub mod redis;
pub mod store;

pub use config::{CacheConfig, CacheLogger, RedisConfig, StoreBackend};
pub use keys::{QueryParams, cache_key, parse_query, resource_family};
pub use memory::MemoryStore;
pub use middleware::{ResponseCache, response_cache};
pub use self::redis::RedisStore;
pub use store::{CacheError, CacheStore};
