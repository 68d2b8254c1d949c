//! Health check endpoint

use axum::{Extension, Json};
use serde::Serialize;

/// Credential status captured at startup
#[derive(Debug, Clone)]
pub struct KeyStatus {
    pub configured: bool,
    pub message: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    credentials: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Report whether both hosted APIs are usable
///
/// Missing credentials do not take the service down: queries still get
/// degraded answers, so this reports `degraded` rather than an error status.
pub async fn check(Extension(keys): Extension<KeyStatus>) -> Json<HealthResponse> {
    let response = if keys.configured {
        HealthResponse {
            status: "ready".to_string(),
            credentials: keys.message,
            reason: None,
        }
    } else {
        HealthResponse {
            status: "degraded".to_string(),
            credentials: "incomplete".to_string(),
            reason: Some(keys.message),
        }
    };
    Json(response)
}
