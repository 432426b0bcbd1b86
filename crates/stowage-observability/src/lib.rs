//! Stowage Observability
//!
//! Provides:
//! - Console logging via `tracing-subscriber`
//! - Per-request logging middleware
//! - Prometheus metrics (HTTP traffic plus the cache counters recorded by
//!   `stowage-cache`)
//!
//! # Examples
//!
//! ```no_run
//! use stowage_observability::{init_logging, init_metrics};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging(env!("CARGO_CRATE_NAME"));
//!     let _handle = init_metrics().expect("metrics recorder");
//!     // ... application code ...
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use metrics_exporter_prometheus::PrometheusHandle;

pub use self::logging::{init_logging, logging_middleware};
pub use self::metrics::{init_metrics, is_metrics_enabled, metrics_app, metrics_middleware};
