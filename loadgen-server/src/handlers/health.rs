//! Liveness and service descriptor endpoints

use axum::Json;
use tracing::debug;

use crate::app::ENDPOINTS;
use crate::models::{EndpointInfo, HealthResponse, ServiceDescriptor};

/// Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse::ok())
}

/// Root handler describing the service and its routes
pub async fn root_handler() -> Json<ServiceDescriptor> {
    Json(ServiceDescriptor {
        service: "loadgen".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        endpoints: ENDPOINTS
            .iter()
            .map(|endpoint| EndpointInfo {
                path: endpoint.path.to_string(),
                methods: endpoint.methods.iter().map(|m| m.to_string()).collect(),
                description: endpoint.description.to_string(),
            })
            .collect(),
    })
}
