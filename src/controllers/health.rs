use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::domain::session::ProviderStatus;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Reads the provider flag without the session lock, so it answers while a
/// synthesis holds the session
pub async fn health_ready(State(status): State<ProviderStatus>) -> impl IntoResponse {
    let tts = if status.is_available() {
        "available"
    } else {
        "no_credential"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "tts": tts
        })),
    )
}
