//! Application router and middleware stack

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use loadgen_config::ServerConfig;
use loadgen_web::{
    cors_layer_with_config, error_handler_middleware, handle_method_not_allowed, handle_not_found,
    request_id_middleware, track_metrics, CorsConfig, MetricsRegistry,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Enable CORS middleware
    pub enable_cors: bool,
    /// Enable request ID tracking
    pub enable_request_id: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Origins accepted by the CORS layer
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            enable_cors: config.enable_cors,
            enable_request_id: config.enable_request_id,
            enable_tracing: config.enable_tracing,
            cors_origins: config.cors.allowed_origins.clone(),
        }
    }
}

/// A routed endpoint
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub path: &'static str,
    pub methods: &'static [&'static str],
    pub description: &'static str,
}

/// Every route served by [`create_app`]
pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        path: "/",
        methods: &["GET"],
        description: "Service descriptor",
    },
    Endpoint {
        path: "/healthz",
        methods: &["GET"],
        description: "Liveness probe",
    },
    Endpoint {
        path: "/cpu",
        methods: &["GET", "POST"],
        description: "CPU workload (?iterations=N)",
    },
    Endpoint {
        path: "/memory",
        methods: &["GET", "POST"],
        description: "Memory workload (?size=N&heavy_agg=true)",
    },
    Endpoint {
        path: "/analyze",
        methods: &["POST"],
        description: "Transaction analysis over a JSON batch",
    },
    Endpoint {
        path: "/metrics",
        methods: &["GET"],
        description: "Prometheus metrics",
    },
];

/// Build the complete application router.
///
/// The metrics middleware is the outermost layer so that every response,
/// including 404 and 405 fallbacks, is counted and timed.
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let metrics = state.metrics.clone();

    // HEAD is listed explicitly: axum would otherwise answer it with the GET handler
    let mut app = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/healthz", get(handlers::health_check))
        .route(
            "/cpu",
            get(handlers::cpu_workload)
                .post(handlers::cpu_workload)
                .head(handle_method_not_allowed)
                .fallback(handle_method_not_allowed),
        )
        .route(
            "/memory",
            get(handlers::memory_workload)
                .post(handlers::memory_workload)
                .head(handle_method_not_allowed)
                .fallback(handle_method_not_allowed),
        )
        .route("/analyze", post(handlers::analyze_transactions))
        .route("/metrics", get(handlers::metrics_handler))
        .fallback(handle_not_found)
        .with_state(state);

    // Add middleware layers (applied in reverse order)
    app = app.layer(middleware::from_fn(error_handler_middleware));

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    if config.enable_request_id {
        app = app.layer(middleware::from_fn(request_id_middleware));
    }

    if config.enable_cors {
        app = app.layer(cors_layer_with_config(CorsConfig::with_origins(config.cors_origins.clone())));
    }

    app.layer(middleware::from_fn_with_state(metrics, track_metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use loadgen_web::{ELAPSED_HEADER, REQUEST_ID_HEADER};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<MetricsRegistry>) {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let app = create_app(AppState::new(metrics.clone()), &AppConfig::default());
        (app, metrics)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let (app, metrics) = test_app();
        let response = send(&app, "GET", "/healthz", Body::empty()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(ELAPSED_HEADER));
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(json_body(response).await, serde_json::json!({"status": "ok"}));
        assert_eq!(metrics.request_count("GET", "/healthz", 200), 1);
    }

    #[tokio::test]
    async fn test_cpu_single_iteration() {
        let (app, _) = test_app();
        let response = send(&app, "POST", "/cpu?iterations=1", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 1);
        assert_eq!(body["operations"], 125_100);
        assert!(body["elapsed_ms"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_cpu_bad_iterations_fall_back_to_default() {
        let (app, _) = test_app();
        let response = send(&app, "GET", "/cpu?iterations=abc", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 10);
        assert_eq!(body["operations"], 100 * 125_100);
    }

    #[tokio::test]
    async fn test_cpu_iterations_use_first_value_verbatim() {
        let (app, _) = test_app();
        let body = json_body(send(&app, "GET", "/cpu?iterations=2&iterations=3", Body::empty()).await).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 2);
        assert_eq!(body["operations"], 2 * 125_100);

        let body = json_body(send(&app, "GET", "/cpu?iterations=%202", Body::empty()).await).await;
        assert_eq!(body["operations"], 100 * 125_100);
    }

    #[tokio::test]
    async fn test_memory_small() {
        let (app, _) = test_app();
        let response = send(&app, "GET", "/memory?size=10&heavy_agg=true", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["structures_count"], 30);
        assert_eq!(body["result"]["total_items"], 10);
        assert_eq!(body["result"]["categories"], 10);
        assert_eq!(body["result"]["users"], 10);
        assert_eq!(body["result"]["heavy_agg_done"], true);
        assert_eq!(body["result"]["correlation_size"], 10);
        assert!(body["result"]["category_stats"].is_object());
    }

    #[tokio::test]
    async fn test_unsupported_methods_are_rejected() {
        let (app, metrics) = test_app();

        for method in ["DELETE", "PUT", "PATCH", "HEAD"] {
            for path in ["/cpu", "/memory"] {
                let response = send(&app, method, path, Body::empty()).await;
                assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, path);
                assert!(response.headers().contains_key(ELAPSED_HEADER));
            }
        }

        let response = send(&app, "DELETE", "/cpu", Body::empty()).await;
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Method not allowed");

        assert_eq!(metrics.request_count("DELETE", "/cpu", 405), 2);
        assert_eq!(metrics.request_count("DELETE", "/cpu", 200), 0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (app, metrics) = test_app();
        let response = send(&app, "GET", "/nope", Body::empty()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(ELAPSED_HEADER));
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
        assert_eq!(metrics.request_count("GET", "/nope", 404), 1);
    }

    #[tokio::test]
    async fn test_analyze() {
        let (app, _) = test_app();
        let payload = serde_json::json!({
            "transactions": [
                {"id": 1, "amount": 10.0, "category": "books", "user_id": 7, "ts": "2024-01-01T00:00:00Z"},
                {"id": 2, "amount": 5.0, "category": "games", "user_id": 8, "ts": "2024-01-01T00:01:00Z"}
            ],
            "expand_factor": 3,
            "heavy_agg": true
        });
        let response = send(&app, "POST", "/analyze", Body::from(payload.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["num_input"], 2);
        assert_eq!(body["expanded"], 6);
        assert_eq!(body["totals_by_category"]["books"], 30.0);
        assert_eq!(body["top_users"][0]["user_id"], 7);
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_input() {
        let (app, _) = test_app();

        let payload = serde_json::json!({"transactions": [], "expand_factor": 51});
        let response = send(&app, "POST", "/analyze", Body::from(payload.to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = send(&app, "POST", "/analyze", Body::from("{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, _) = test_app();
        send(&app, "GET", "/healthz", Body::empty()).await;

        let response = send(&app, "GET", "/metrics", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("app_requests_total"));
        assert!(text.contains("endpoint=\"/healthz\""));
        assert!(text.contains("app_request_latency_seconds_bucket"));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let (app, _) = test_app();
        let body = json_body(send(&app, "GET", "/", Body::empty()).await).await;

        assert_eq!(body["service"], "loadgen");
        let paths: Vec<&str> = body["endpoints"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        assert!(paths.contains(&"/cpu"));
        assert!(paths.contains(&"/metrics"));
    }

    #[tokio::test]
    async fn test_optional_layers_disabled() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let config = AppConfig {
            enable_cors: false,
            enable_request_id: false,
            enable_tracing: false,
            ..Default::default()
        };
        let app = create_app(AppState::new(metrics), &config);

        let response = send(&app, "GET", "/healthz", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(ELAPSED_HEADER));
        assert!(!response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_malformed_cors_origin_does_not_open_cors() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let config = AppConfig {
            cors_origins: vec!["https://grafana.internal".to_string(), "bad\norigin".to_string()],
            ..Default::default()
        };
        let app = create_app(AppState::new(metrics), &config);

        let request = Request::builder()
            .uri("/healthz")
            .header("origin", "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
