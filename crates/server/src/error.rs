//! Application error handling

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// The request body could not be read as the expected JSON
    Rejected(JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Rejected(rejection) => (rejection.status(), rejection.body_text()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection)
    }
}

/// `Json` extractor whose rejections use the `{"error": ...}` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
