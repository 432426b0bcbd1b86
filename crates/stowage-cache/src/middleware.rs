//! Response caching middleware.
//!
//! Sits between the router and the handlers of a versioned API tree
//! (`/<version>/<family>/...`) and decides per request:
//!
//! - `GET` on a cached family: serve the stored payload, or run the handler
//!   and store its response when it is a non-empty `200 OK`
//! - `GET` on an outdoors family: pass through untouched
//! - `POST`/`PUT`/`PATCH`/`DELETE`: wildcard-delete the family and every
//!   family grouped with it, then run the handler
//! - anything else: pass through untouched
//!
//! Store failures never fail the request; they are reported to the
//! configured [`CacheLogger`](crate::CacheLogger) and logged. A plain miss is
//! reported too, under `cache.get.miss`, so the logger sees every read that
//! fell through to the handler.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use stowage_cache::{CacheConfig, MemoryStore, ResponseCache, response_cache};
//! use std::sync::Arc;
//!
//! let cache = ResponseCache::new(
//!     Arc::new(MemoryStore::new()),
//!     CacheConfig::default().with_group("product", ["category", "brand"]),
//! );
//!
//! let app = Router::new()
//!     .route("/v1/product/{id}", get(handler))
//!     .layer(middleware::from_fn_with_state(cache, response_cache));
//! ```

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{
        HeaderValue, Method, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::keys;
use crate::store::{CacheError, CacheStore};

/// Content type of responses served from the cache.
const CACHED_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// How the middleware treats a request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodClass {
    Read,
    Mutation,
    Other,
}

impl MethodClass {
    fn of(method: &Method) -> Self {
        match *method {
            Method::GET => MethodClass::Read,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE => MethodClass::Mutation,
            _ => MethodClass::Other,
        }
    }
}

/// Status and body produced by a downstream handler on a cache miss.
#[derive(Debug)]
struct CapturedResponse {
    status: StatusCode,
    body: Bytes,
}

impl CapturedResponse {
    fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK && !self.body.is_empty()
    }
}

/// Buffers the response body so it can be stored, returning a response with
/// the same status, headers and bytes.
///
/// If the body fails mid-stream, the caller gets the original head with an
/// empty body and nothing is captured.
async fn capture(response: Response) -> (Response, Option<CapturedResponse>) {
    let (mut parts, body) = response.into_parts();

    match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            let captured = CapturedResponse {
                status: parts.status,
                body: bytes.clone(),
            };
            (Response::from_parts(parts, Body::from(bytes)), Some(captured))
        }
        Err(e) => {
            warn!(error = %e, "Failed to buffer response body for caching");
            parts.headers.remove(CONTENT_LENGTH);
            (Response::from_parts(parts, Body::empty()), None)
        }
    }
}

/// Shared state of the response cache middleware: the store plus the
/// read-only configuration. Cheap to clone.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    config: Arc<CacheConfig>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn report(&self, label: &str, error: &CacheError) {
        warn!(cache.label = label, error = %error, "Cache store operation failed");
        self.config.report(label, error);
    }

    /// Serves a GET from the store, or runs the handler and stores a
    /// cacheable response.
    async fn serve_read(
        &self,
        path: &str,
        query: Option<&str>,
        request: Request,
        next: Next,
    ) -> Response {
        let params = keys::parse_query(query);
        let key = keys::cache_key(path, &params);

        match self.store.get(&key).await {
            Ok(payload) if !payload.is_empty() => {
                debug!(cache.key = %key, "Cache hit");
                counter!("cache_lookups_total", "outcome" => "hit").increment(1);
                return cached_response(payload);
            }
            Ok(_) => debug!(cache.key = %key, "Empty cached payload, treating as miss"),
            Err(e @ CacheError::Miss) => {
                debug!(cache.key = %key, "Cache miss");
                self.config.report("cache.get.miss", &e);
            }
            Err(e) => self.report("cache.get", &e),
        }
        counter!("cache_lookups_total", "outcome" => "miss").increment(1);

        let response = next.run(request).await;

        // Only a 200 can be stored, so anything else streams through as is.
        if response.status() != StatusCode::OK {
            return response;
        }

        let (response, captured) = capture(response).await;

        if let Some(captured) = captured.filter(CapturedResponse::is_cacheable) {
            match self.store.set(&key, captured.body, self.config.ttl).await {
                Ok(()) => {
                    debug!(cache.key = %key, "Response cached");
                    counter!("cache_stores_total").increment(1);
                }
                Err(e) => self.report("cache.set", &e),
            }
        }

        response
    }

    /// Wildcard-deletes the family of `path`, then each family grouped with
    /// it. Every deletion is attempted regardless of earlier failures.
    ///
    /// A path without a family segment (`/v1`) has the empty family, whose
    /// pattern `/v1/*` clears the whole version.
    async fn invalidate(&self, path: &str) {
        let version = keys::api_version(path);
        let family = keys::resource_family(path);

        self.delete_family(version, family, "cache.delete_wildcard.family")
            .await;

        for related in self.config.related(family) {
            self.delete_family(version, related, "cache.delete_wildcard.related")
                .await;
        }
    }

    async fn delete_family(&self, version: &str, family: &str, label: &str) {
        let pattern = keys::invalidation_pattern(version, family);

        match self.store.delete_wildcard(&pattern).await {
            Ok(deleted) => {
                debug!(cache.pattern = %pattern, cache.deleted = deleted, "Cache family invalidated");
                counter!("cache_invalidations_total", "status" => "ok").increment(1);
            }
            Err(e) => {
                self.report(label, &e);
                counter!("cache_invalidations_total", "status" => "error").increment(1);
            }
        }
    }
}

fn cached_response(payload: Bytes) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, HeaderValue::from_static(CACHED_CONTENT_TYPE))],
        payload,
    )
        .into_response()
}

/// Response cache middleware.
///
/// Use with [`axum::middleware::from_fn_with_state`] and a
/// [`ResponseCache`] state. Keys are derived from the request's original
/// URI, so the layer sees `/v1/product/1` even on a router nested at `/v1`.
pub async fn response_cache(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| request.uri().clone());
    let path = uri.path();
    let family = keys::resource_family(path);

    match MethodClass::of(request.method()) {
        MethodClass::Read if cache.config.is_outdoors(family) => {
            debug!(cache.family = %family, "Outdoors family, bypassing cache");
            counter!("cache_lookups_total", "outcome" => "bypass").increment(1);
            next.run(request).await
        }
        MethodClass::Read => cache.serve_read(path, uri.query(), request, next).await,
        MethodClass::Mutation => {
            cache.invalidate(path).await;
            next.run(request).await
        }
        MethodClass::Other => next.run(request).await,
    }
}
