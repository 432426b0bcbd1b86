//! # Stowage
//!
//! An axum service fronted by a Redis-backed response cache.
//!
//! Successful `GET` responses under `/v1` are cached by path and sorted query
//! parameters; `POST`/`PUT`/`PATCH`/`DELETE` requests invalidate the touched
//! resource family and every family grouped with it. The caching engine
//! lives in the `stowage-cache` crate; this crate wires it into a running
//! service.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── config/           # Server configuration, cache config re-exports
//! ├── modules/
//! │   └── catalog/     # Generic catalog API under /v1/{family}
//! ├── router.rs         # Router and middleware stack
//! ├── state.rs          # Shared state and cache store selection
//! └── utils/            # Error type
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! CACHE_BACKEND=redis
//! REDIS_URL=redis://127.0.0.1:6379/0
//! CACHE_TTL_SECONDS=300
//! CACHE_GROUPS='{"product": ["category", "brand"]}'
//! CACHE_OUTDOORS=auth
//! ```
//!
//! ```bash
//! cargo run --bin stowage
//! ```

pub mod config;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;

pub use stowage_cache;
