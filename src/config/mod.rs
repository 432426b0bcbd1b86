//! Configuration for the Stowage service.
//!
//! Everything is loaded from environment variables (a `.env` file is read at
//! startup). Cache settings live in [`stowage_cache::config`]; this module
//! re-exports them next to the service's own settings.
//!
//! # Modules
//!
//! - [`server`]: Listener address

pub mod server;

pub use server::ServerConfig;
pub use stowage_cache::config::{CacheConfig, RedisConfig, StoreBackend};
