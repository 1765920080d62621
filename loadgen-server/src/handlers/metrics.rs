//! Prometheus scrape endpoint

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use loadgen_web::WebResult;

use crate::app::AppState;

/// Render the request metrics in the text exposition format
pub async fn metrics_handler(State(state): State<AppState>) -> WebResult<Response> {
    let body = state.metrics.render()?;
    Ok(([(CONTENT_TYPE, state.metrics.content_type())], body).into_response())
}
