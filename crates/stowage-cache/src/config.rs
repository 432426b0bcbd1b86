//! Response cache configuration.
//!
//! [`CacheConfig`] is built once at startup and shared read-only by every
//! request. [`RedisConfig`] and [`StoreBackend`] describe which store the
//! host should construct.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::store::CacheError;

/// Default time-to-live for cached responses in seconds.
const DEFAULT_TTL_SECONDS: u64 = 300;

/// Diagnostic sink for store failures.
///
/// Called with an identifying label (`"cache.get"`, `"cache.set"`, ...) and
/// the error. It runs on the request path, so it must not block.
pub type CacheLogger = Arc<dyn Fn(&str, &CacheError) + Send + Sync>;

/// Response cache configuration.
///
/// # Environment Variables
///
/// - `CACHE_TTL_SECONDS`: Default TTL for cached responses (default: `300`)
/// - `CACHE_GROUPS`: JSON object mapping a family to related families,
///   e.g. `{"product": ["category", "brand"]}` (default: empty)
/// - `CACHE_OUTDOORS`: Comma-separated families never cached on GET
///   (default: empty)
#[derive(Clone)]
pub struct CacheConfig {
    /// Time-to-live for newly cached responses.
    pub ttl: Duration,

    /// Families invalidated alongside a mutated family, in order.
    pub groups: HashMap<String, Vec<String>>,

    /// Families whose GET responses are never cached. Mutations on these
    /// families still invalidate.
    pub outdoors: HashSet<String>,

    /// Optional sink for store errors.
    pub logger: Option<CacheLogger>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            groups: HashMap::new(),
            outdoors: HashSet::new(),
            logger: None,
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("ttl", &self.ttl)
            .field("groups", &self.groups)
            .field("outdoors", &self.outdoors)
            .field("logger", &self.logger.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl CacheConfig {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults; a malformed
    /// `CACHE_GROUPS` is logged and ignored.
    pub fn from_env() -> Self {
        let ttl_seconds = env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        let groups = match env::var("CACHE_GROUPS") {
            Ok(raw) => parse_groups(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring malformed CACHE_GROUPS");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        let outdoors = env::var("CACHE_OUTDOORS")
            .map(|raw| parse_outdoors(&raw))
            .unwrap_or_default();

        Self {
            ttl: Duration::from_secs(ttl_seconds),
            groups,
            outdoors,
            logger: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Declare that mutating `family` also invalidates each of `related`.
    pub fn with_group<I, S>(mut self, family: impl Into<String>, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(family.into(), related.into_iter().map(Into::into).collect());
        self
    }

    /// Exempt `family` from GET caching.
    pub fn with_outdoors(mut self, family: impl Into<String>) -> Self {
        self.outdoors.insert(family.into());
        self
    }

    pub fn with_logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(&str, &CacheError) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Whether GET responses of `family` bypass the cache.
    pub fn is_outdoors(&self, family: &str) -> bool {
        self.outdoors.contains(family)
    }

    /// Families to invalidate in addition to `family` itself.
    pub fn related(&self, family: &str) -> &[String] {
        self.groups.get(family).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Report a store failure to the configured logger, if any.
    pub(crate) fn report(&self, label: &str, error: &CacheError) {
        if let Some(logger) = &self.logger {
            logger(label, error);
        }
    }
}

/// Parses the `CACHE_GROUPS` JSON object.
pub fn parse_groups(raw: &str) -> Result<HashMap<String, Vec<String>>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(raw)
}

/// Parses a comma-separated list of families, skipping blanks.
pub fn parse_outdoors(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Which store backs the response cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

impl StoreBackend {
    /// Reads `CACHE_BACKEND` (`redis` or `memory`, default `redis`).
    pub fn from_env() -> Self {
        match env::var("CACHE_BACKEND") {
            Ok(v) if v.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Ok(v) if !v.eq_ignore_ascii_case("redis") => {
                warn!(backend = %v, "Unknown CACHE_BACKEND, using redis");
                StoreBackend::Redis
            }
            _ => StoreBackend::Redis,
        }
    }
}

/// Redis connection settings.
///
/// # Environment Variables
///
/// - `REDIS_URL`: Full connection URL; overrides the fields below when set
/// - `REDIS_HOST`: Host (default: `127.0.0.1`)
/// - `REDIS_PORT`: Port (default: `6379`)
/// - `REDIS_PASSWORD`: Password (default: none)
/// - `REDIS_DB`: Database index (default: `0`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub database: i64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".into(),
            port: 6379,
            password: None,
            database: 0,
        }
    }
}

impl RedisConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            host: env::var("REDIS_HOST").unwrap_or(defaults.host),
            port: env::var("REDIS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            password: env::var("REDIS_PASSWORD").ok().filter(|v| !v.is_empty()),
            database: env::var("REDIS_DB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.database),
        }
    }

    /// Connection URL in `redis://[:password@]host:port/db` form.
    pub fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.database
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.database),
        }
    }
}
