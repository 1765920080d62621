pub mod cors;
pub mod error_handler;
pub mod metrics;
pub mod request_id;

// Re-export layer creation functions
pub use cors::{cors_layer, cors_layer_with_config, CorsConfig};
pub use error_handler::{
    error_handler_middleware, handle_method_not_allowed, handle_not_found, METHOD_NOT_ALLOWED_BODY,
};
pub use metrics::{format_elapsed_ms, track_metrics, MetricsRegistry, ELAPSED_HEADER, REQUESTS_TOTAL, REQUEST_LATENCY};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
