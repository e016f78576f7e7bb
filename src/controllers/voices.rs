use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::session::SharedSession;
use crate::{
    domain::tts::{ModelId, Voice},
    error::AppResult,
};

/// Response for GET /api/voices
#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
    pub warnings: Vec<String>,
}

/// Response for GET /api/models
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub default: ModelId,
    pub models: Vec<ModelId>,
}

pub struct VoiceController {
    session: SharedSession,
    default_model: ModelId,
}

impl VoiceController {
    pub fn new(session: SharedSession, default_model: ModelId) -> Self {
        Self {
            session,
            default_model,
        }
    }

    /// GET /api/voices - Voices for the session's credential
    ///
    /// Never fails: a provider problem yields an empty list and a warning,
    /// and the caller falls back to entering a voice id by hand.
    pub async fn list_voices(
        State(controller): State<Arc<VoiceController>>,
    ) -> AppResult<Json<VoicesResponse>> {
        let listing = controller.session.lock().await.list_voices().await;

        Ok(Json(VoicesResponse {
            voices: listing.voices,
            warnings: listing.warning.into_iter().collect(),
        }))
    }

    /// GET /api/models - Known models, configured default first
    pub async fn list_models(
        State(controller): State<Arc<VoiceController>>,
    ) -> AppResult<Json<ModelsResponse>> {
        let default = controller.default_model;
        let models = std::iter::once(default)
            .chain(ModelId::ALL.into_iter().filter(|m| *m != default))
            .collect();

        Ok(Json(ModelsResponse { default, models }))
    }
}
