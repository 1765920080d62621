use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::errors::WebError;

/// Plain-text body returned for unsupported methods on workload routes
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method not allowed";

/// Middleware logging every server error that leaves the router
pub async fn error_handler_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    if response.status().is_server_error() {
        error!(%method, %path, status = %response.status(), "Request failed with server error");
    }

    response
}

/// Router fallback for unknown routes
pub async fn handle_not_found() -> Response {
    WebError::not_found("The requested resource was not found").into_response()
}

/// Method fallback for workload routes.
///
/// Answers with a plain-text body rather than the JSON envelope.
pub async fn handle_method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY).into_response()
}
