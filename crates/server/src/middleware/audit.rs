//! Audit logging for requests that change or query the assistant

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::request_id::RequestId;

/// Middleware to log POST requests (chat questions and directory additions)
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    if method == Method::POST {
        let status = response.status().as_u16();

        tracing::info!(
            target: "audit",
            request_id = %request_id,
            method = %method,
            path = %uri,
            status = %status,
            "POST request"
        );
    }

    response
}
