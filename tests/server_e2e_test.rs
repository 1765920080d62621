//! End-to-end test against a real listening server

use anyhow::Result;
use loadgen_config::LoadgenConfig;
use loadgen_server::Server;
use loadgen_web::{ELAPSED_HEADER, REQUEST_ID_HEADER};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_serve_over_tcp_and_shut_down() -> Result<()> {
    let mut config = LoadgenConfig::default();
    config.server.bind_address = "127.0.0.1".to_string();
    config.server.shutdown_timeout = Duration::from_secs(2);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = Server::new(config)?;
    let metrics = server.state().metrics.clone();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(listener, async {
        let _ = shutdown_rx.await;
    }));

    let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
    let base_url = format!("http://{}", addr);

    let response = client
        .get(format!("{}/healthz", base_url))
        .header(REQUEST_ID_HEADER, "e2e-1")
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "e2e-1");
    assert!(response.headers().contains_key(ELAPSED_HEADER));
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "ok");

    let response = client.post(format!("{}/cpu?iterations=2", base_url)).send().await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["operations"], 2 * 125_100);

    let response = client.delete(format!("{}/memory", base_url)).send().await?;
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.text().await?, "Method not allowed");

    let scrape = client.get(format!("{}/metrics", base_url)).send().await?.text().await?;
    assert!(scrape.contains("app_requests_total"));

    assert_eq!(metrics.request_count("GET", "/healthz", 200), 1);
    assert_eq!(metrics.request_count("POST", "/cpu", 200), 1);
    assert_eq!(metrics.request_count("DELETE", "/memory", 405), 1);

    shutdown_tx.send(()).ok();
    tokio::time::timeout(Duration::from_secs(10), handle).await???;

    Ok(())
}
