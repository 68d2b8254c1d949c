//! Chat endpoint

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::ai::HealthBuddy;
use crate::error::{AppError, AppJson};

/// Request body for chat
#[derive(Deserialize)]
pub struct ChatRequest {
    message: String,
}

/// Response body for chat
#[derive(Serialize)]
pub struct ChatResponse {
    response: String,
}

/// POST /chat - Ask HealthBuddy a health question
///
/// Search and LLM failures are absorbed by the dispatcher, so any non-blank
/// message gets a 200 with a non-empty answer.
pub async fn ask(
    State(buddy): State<HealthBuddy>,
    AppJson(body): AppJson<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    if body.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    tracing::info!(query_len = body.message.len(), "Chat request");

    let response = buddy.ask_healthbuddy(&body.message).await;
    Ok(Json(ChatResponse { response }))
}
