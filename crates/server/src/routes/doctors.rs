//! Doctor directory endpoints

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use healthbuddy_core::DoctorRecord;
use serde::{Deserialize, Serialize};

use crate::ai::HealthBuddy;
use crate::error::AppJson;

/// Query parameters for listing doctors
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub specialty: Option<String>,
}

/// Response body after adding a doctor
#[derive(Serialize)]
pub struct CreateResponse {
    message: String,
}

/// GET /doctors - List doctors, optionally filtered by specialty substring
pub async fn list(
    State(buddy): State<HealthBuddy>,
    Query(params): Query<ListParams>,
) -> Json<Vec<DoctorRecord>> {
    let doctors = match params.specialty.as_deref() {
        Some(specialty) => buddy.find_doctor(specialty),
        None => buddy.doctors(),
    };
    Json(doctors)
}

/// POST /doctors - Append a doctor to the directory
pub async fn create(
    State(buddy): State<HealthBuddy>,
    AppJson(record): AppJson<DoctorRecord>,
) -> impl IntoResponse {
    let message = buddy.add_new_doctor(
        &record.name,
        &record.specialty,
        &record.hours,
        &record.location,
        &record.contact,
    );

    (StatusCode::CREATED, Json(CreateResponse { message }))
}
