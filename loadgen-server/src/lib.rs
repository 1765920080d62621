//! Loadgen HTTP service
//!
//! Serves the synthetic CPU, memory and analysis workloads from
//! `loadgen-core` behind the metrics and request-id middleware from
//! `loadgen-web`.

pub mod app;
pub mod handlers;
pub mod models;
pub mod runtime;
pub mod startup;

// Re-export main components
pub use app::{create_app, AppConfig, AppState, Endpoint, ENDPOINTS};
pub use runtime::build_runtime;
pub use startup::{shutdown_signal, Server};
