use std::sync::Arc;

use metrics::counter;
use stowage_cache::{
    CacheConfig, CacheError, CacheStore, MemoryStore, RedisConfig, RedisStore, ResponseCache,
    StoreBackend,
};
use tracing::info;

use crate::modules::catalog::Catalog;

#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Catalog,
    pub cache: ResponseCache,
}

impl AppState {
    pub fn new(catalog: Catalog, cache: ResponseCache) -> Self {
        Self { catalog, cache }
    }
}

/// Connects the store selected by `backend`.
pub async fn init_store(backend: StoreBackend) -> Result<Arc<dyn CacheStore>, CacheError> {
    match backend {
        StoreBackend::Redis => {
            let config = RedisConfig::from_env();
            let store = RedisStore::from_config(&config).await?;
            info!(host = %config.host, port = config.port, "Using Redis cache store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-process cache store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Cache configuration from the environment, with store failures counted
/// per label. Misses are already counted by `cache_lookups_total`.
pub fn cache_config_from_env() -> CacheConfig {
    CacheConfig::from_env().with_logger(|label, error| {
        if error.is_miss() {
            return;
        }
        counter!("cache_errors_total", "label" => label.to_string()).increment(1);
    })
}

pub async fn init_app_state() -> Result<AppState, CacheError> {
    let store = init_store(StoreBackend::from_env()).await?;
    let cache = ResponseCache::new(store, cache_config_from_env());

    let config = cache.config();
    info!(
        ttl_secs = config.ttl.as_secs(),
        groups = config.groups.len(),
        outdoors = config.outdoors.len(),
        "Response cache configured"
    );

    Ok(AppState::new(Catalog::new(), cache))
}
