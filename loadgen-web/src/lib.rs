//! # Loadgen Web Utilities
//!
//! Axum middleware and helpers shared by the loadgen HTTP service.
//!
//! ## Features
//!
//! - **Middleware**: request metrics with `X-Elapsed-ms`, request ids, CORS, error logging
//! - **Extractors**: lenient workload query parameters that never reject a request
//! - **Errors**: `WebError` with a consistent JSON error envelope
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{middleware, routing::get, Router};
//! use loadgen_web::{track_metrics, MetricsRegistry, WorkloadParams};
//!
//! async fn work(params: WorkloadParams) -> String {
//!     format!("{:?}", params.positive_int("iterations"))
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = Arc::new(MetricsRegistry::new()?);
//! let app: Router = Router::new()
//!     .route("/work", get(work))
//!     .layer(middleware::from_fn_with_state(metrics, track_metrics));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod extractors;
pub mod middleware;

// Re-export commonly used types and functions
pub use errors::{ValidationError, WebError, WebResult};
pub use extractors::WorkloadParams;
pub use middleware::{
    cors_layer, cors_layer_with_config, error_handler_middleware, handle_method_not_allowed, handle_not_found,
    request_id_middleware, track_metrics, CorsConfig, MetricsRegistry, RequestId, ELAPSED_HEADER, REQUEST_ID_HEADER,
};
