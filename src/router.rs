use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use stowage_cache::response_cache;
use stowage_observability::{PrometheusHandle, logging_middleware, metrics_app, metrics_middleware};
use tower_http::trace::TraceLayer;

use crate::modules::catalog::init_catalog_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router.
///
/// Only the versioned `/v1` tree goes through the response cache; `/health`
/// and `/metrics` are always served live.
pub fn init_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let api = init_catalog_router().layer(middleware::from_fn_with_state(
        state.cache.clone(),
        response_cache,
    ));

    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/v1", api)
        .with_state(state);

    if let Some(handle) = metrics {
        router = router.merge(metrics_app(handle));
    }

    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
}
