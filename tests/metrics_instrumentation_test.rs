//! Request metrics behaviour of the assembled router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures::future::join_all;
use loadgen_server::{create_app, AppConfig, AppState};
use loadgen_web::{MetricsRegistry, ELAPSED_HEADER};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with_metrics() -> (Router, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new().expect("metrics registry"));
    let app = create_app(AppState::new(metrics.clone()), &AppConfig::default());
    (app, metrics)
}

async fn call(app: &Router, method: &str, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_sequential_requests_are_all_counted() {
    let (app, metrics) = app_with_metrics();
    const N: u64 = 25;

    for _ in 0..N {
        let response = call(&app, "GET", "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(metrics.request_count("GET", "/healthz", 200), N);
    assert_eq!(metrics.latency_observations("GET", "/healthz"), N);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_lose_no_increments() {
    let (app, metrics) = app_with_metrics();
    const TASKS: usize = 16;
    const PER_TASK: usize = 20;

    let handles = (0..TASKS).map(|_| {
        let app = app.clone();
        tokio::spawn(async move {
            for _ in 0..PER_TASK {
                let response = call(&app, "GET", "/healthz").await;
                assert_eq!(response.status(), StatusCode::OK);
            }
        })
    });

    for result in join_all(handles).await {
        result.expect("request task panicked");
    }

    let expected = (TASKS * PER_TASK) as u64;
    assert_eq!(metrics.request_count("GET", "/healthz", 200), expected);
    assert_eq!(metrics.latency_observations("GET", "/healthz"), expected);
}

#[tokio::test]
async fn test_method_not_allowed_is_counted_but_runs_nothing() {
    let (app, metrics) = app_with_metrics();

    let response = call(&app, "DELETE", "/cpu").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let elapsed: f64 = response.headers()[ELAPSED_HEADER].to_str().unwrap().parse().unwrap();
    // A 100-round CPU workload takes far longer than this
    assert!(elapsed < 50.0, "405 took {}ms", elapsed);

    assert_eq!(metrics.request_count("DELETE", "/cpu", 405), 1);
    assert_eq!(metrics.request_count("GET", "/cpu", 200), 0);
    assert_eq!(metrics.request_count("POST", "/cpu", 200), 0);
}

#[tokio::test]
async fn test_elapsed_header_has_two_decimals() {
    let (app, _) = app_with_metrics();

    for (method, uri) in [("GET", "/healthz"), ("GET", "/missing"), ("PUT", "/memory"), ("GET", "/cpu?iterations=1")] {
        let response = call(&app, method, uri).await;
        let header = response.headers()[ELAPSED_HEADER].to_str().unwrap().to_string();
        let (_, decimals) = header.split_once('.').expect("decimal point");
        assert_eq!(decimals.len(), 2, "{} {} -> {}", method, uri, header);
    }
}

#[tokio::test]
async fn test_scrape_reflects_workload_traffic() {
    let (app, _) = app_with_metrics();

    call(&app, "POST", "/cpu?iterations=1").await;
    call(&app, "GET", "/memory?size=20").await;
    call(&app, "GET", "/missing").await;

    let response = call(&app, "GET", "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    let has_sample = |labels: &[&str]| {
        text.lines()
            .filter(|line| line.starts_with("app_requests_total{"))
            .any(|line| labels.iter().all(|label| line.contains(label)))
    };

    assert!(has_sample(&["method=\"POST\"", "endpoint=\"/cpu\"", "status=\"200\""]));
    assert!(has_sample(&["method=\"GET\"", "endpoint=\"/memory\"", "status=\"200\""]));
    assert!(has_sample(&["endpoint=\"/missing\"", "status=\"404\""]));
    assert!(text.contains("app_request_latency_seconds_count"));
}
