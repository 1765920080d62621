use axum::http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::metrics::ELAPSED_HEADER;
use super::request_id::REQUEST_ID_HEADER;

/// CORS configuration for browser-based load dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins (`["*"]` allows any origin)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed request headers
    pub allowed_headers: Vec<String>,
    /// Maximum age for preflight cache
    pub max_age: Option<Duration>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec![
                "content-type".to_string(),
                "accept".to_string(),
                "x-request-id".to_string(),
            ],
            max_age: Some(Duration::from_secs(3600)),
        }
    }
}

impl CorsConfig {
    /// Restrict to specific origins
    pub fn with_origins(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.allowed_origins.is_empty() {
            return Err("At least one allowed origin is required".to_string());
        }

        if let Some(bad) = self
            .allowed_origins
            .iter()
            .filter(|o| o.as_str() != "*")
            .find(|o| o.parse::<HeaderValue>().is_err())
        {
            return Err(format!("Invalid origin '{}'", bad));
        }

        Ok(())
    }
}

/// Create CORS layer with the default configuration
pub fn cors_layer() -> CorsLayer {
    cors_layer_with_config(CorsConfig::default())
}

/// Create CORS layer with custom configuration.
///
/// An invalid configuration yields a layer that allows no origin at all.
pub fn cors_layer_with_config(config: CorsConfig) -> CorsLayer {
    if let Err(e) = config.validate() {
        tracing::error!("Invalid CORS configuration: {}, denying all cross-origin requests", e);
        return CorsLayer::new();
    }

    let origin: AllowOrigin = if config.allowed_origins.iter().any(|o| o == "*") {
        Any.into()
    } else {
        config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>()
            .into()
    };

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|method| method.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter_map(|header| header.parse().ok())
        .collect();

    let mut cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers(
            [ELAPSED_HEADER, REQUEST_ID_HEADER]
                .iter()
                .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
                .collect::<Vec<_>>(),
        );

    if let Some(max_age) = config.max_age {
        cors = cors.max_age(max_age);
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::{routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CorsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_origins() {
        assert!(CorsConfig::with_origins(vec![]).validate().is_err());
        assert!(CorsConfig::with_origins(vec!["bad\norigin".to_string()])
            .validate()
            .is_err());
        assert!(CorsConfig::with_origins(vec!["https://grafana.local".to_string()])
            .validate()
            .is_ok());
    }

    #[tokio::test]
    async fn test_exposes_timing_header() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer());

        let request = Request::builder()
            .uri("/")
            .header("origin", "https://dashboard.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        let exposed = response
            .headers()
            .get("access-control-expose-headers")
            .unwrap()
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(exposed.contains("x-elapsed-ms"));
    }

    #[tokio::test]
    async fn test_invalid_origin_list_never_allows_any_origin() {
        let config = CorsConfig::with_origins(vec![
            "https://grafana.internal".to_string(),
            "bad\norigin".to_string(),
        ]);
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer_with_config(config));

        let request = Request::builder()
            .uri("/")
            .header("origin", "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_listed_origin_is_echoed() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer_with_config(CorsConfig::with_origins(vec![
                "https://grafana.internal".to_string(),
            ])));

        let request = Request::builder()
            .uri("/")
            .header("origin", "https://grafana.internal")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://grafana.internal"
        );
    }
}
