pub mod chat;
pub mod doctors;
pub mod health;
pub mod metrics;

use axum::{
    Router,
    routing::{get, post},
};

use crate::ai::HealthBuddy;

/// Build the assistant routes
pub fn api_routes() -> Router<HealthBuddy> {
    Router::new()
        .route("/chat", post(chat::ask))
        .route("/doctors", get(doctors::list).post(doctors::create))
}
