//! Console logging and per-request log lines.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the default filter directive for `crate_name` at `log_level`, with
/// noisy dependencies held at `warn`.
pub fn default_filter(crate_name: &str, log_level: &str) -> String {
    format!(
        "{crate_name}={log_level},stowage_cache={log_level},stowage_observability={log_level},tower_http=warn,hyper=warn,redis=warn"
    )
}

/// Initialize console logging.
///
/// # Configuration
///
/// - **Filter**: `RUST_LOG` when set, otherwise [`default_filter`] with the
///   level from `LOG_LEVEL` (default: "info")
/// - **Format**: Compact, with targets, file and line numbers
///
/// Calling this twice panics, as with any global subscriber.
pub fn init_logging(crate_name: &str) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(crate_name, &log_level)));

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(console_layer).init();
}

/// Logs one line per request with a request id, method, matched path,
/// status and latency. Level follows the status class.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Server error"
        ),
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Client error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Request completed"
        ),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = default_filter("stowage", "debug");
        assert!(filter.starts_with("stowage=debug,"));
        assert!(filter.contains("stowage_cache=debug"));
        assert!(filter.contains("tower_http=warn"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
