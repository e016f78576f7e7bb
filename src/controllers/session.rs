use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    domain::{
        dictionary::DictionarySelection,
        session::{GenerateCommand, HistoryEntry, SessionService},
        tts::{ModelId, SynthesisParameters, VoiceSettings},
    },
    error::{AppError, AppResult},
};

/// The one session this process serves. The lock makes every action run to
/// completion before the next one starts.
pub type SharedSession = Arc<Mutex<SessionService>>;

/// `attachment` disposition for a sanitized file name. Non-ASCII names get an
/// ASCII fallback plus an RFC 6266 `filename*` carrying the UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    if file_name.is_ascii() {
        return format!("attachment; filename=\"{}\"", file_name);
    }

    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

/// Request for POST /api/session/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ModelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,
    #[serde(default)]
    pub use_pronunciation_dictionary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_dictionary_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_dictionary_name: Option<String>,
}

/// Request for PUT /api/session/credential
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialResponse {
    pub has_credential: bool,
    pub provider_available: bool,
}

/// Snapshot of the current take and the recent saved clips
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub current_text: String,
    pub has_audio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_byte_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<SynthesisParameters>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub warnings: Vec<String>,
}

pub struct SessionController {
    session: SharedSession,
    default_model: ModelId,
    dictionary_path: PathBuf,
    dictionary_name: String,
    history_display_limit: usize,
}

impl SessionController {
    pub fn new(
        session: SharedSession,
        default_model: ModelId,
        dictionary_path: PathBuf,
        dictionary_name: String,
        history_display_limit: usize,
    ) -> Self {
        Self {
            session,
            default_model,
            dictionary_path,
            dictionary_name,
            history_display_limit,
        }
    }

    fn snapshot(&self, session: &SessionService) -> SessionResponse {
        let state = session.state();
        SessionResponse {
            current_text: state.current_text().to_string(),
            has_audio: state.current_audio().is_some(),
            audio_byte_length: state.current_audio().map(<[u8]>::len),
            parameters: state.current_parameters().cloned(),
            history: state
                .recent_history(self.history_display_limit)
                .cloned()
                .collect(),
        }
    }

    fn to_command(&self, request: GenerateRequest) -> GenerateCommand {
        let pronunciation_dictionary =
            request
                .use_pronunciation_dictionary
                .then(|| DictionarySelection {
                    path: request
                        .pronunciation_dictionary_path
                        .unwrap_or_else(|| self.dictionary_path.clone()),
                    name: request
                        .pronunciation_dictionary_name
                        .unwrap_or_else(|| self.dictionary_name.clone()),
                });

        GenerateCommand {
            text: request.text,
            voice_id: request.voice_id,
            model_id: request.model_id.unwrap_or(self.default_model),
            voice_settings: request.voice_settings,
            pronunciation_dictionary,
        }
    }

    /// GET /api/session - Current take and recent history
    pub async fn get_session(
        State(controller): State<Arc<SessionController>>,
    ) -> AppResult<Json<SessionResponse>> {
        let session = controller.session.lock().await;
        Ok(Json(controller.snapshot(&session)))
    }

    /// PUT /api/session/credential - Set or clear the API key for this session
    pub async fn set_credential(
        State(controller): State<Arc<SessionController>>,
        Json(request): Json<CredentialRequest>,
    ) -> AppResult<Json<CredentialResponse>> {
        let mut session = controller.session.lock().await;
        session.set_api_key(request.api_key);
        Ok(Json(CredentialResponse {
            has_credential: session.has_credential(),
            provider_available: session.is_provider_available(),
        }))
    }

    /// POST /api/session/generate - Synthesize a new take
    pub async fn generate(
        State(controller): State<Arc<SessionController>>,
        Json(request): Json<GenerateRequest>,
    ) -> AppResult<Json<GenerateResponse>> {
        let command = controller.to_command(request);
        let mut session = controller.session.lock().await;

        let outcome = session.generate(command).await?;

        Ok(Json(GenerateResponse {
            session: controller.snapshot(&session),
            warnings: outcome.warnings,
        }))
    }

    /// POST /api/session/regenerate - Synthesize the current take again
    pub async fn regenerate(
        State(controller): State<Arc<SessionController>>,
    ) -> AppResult<Json<SessionResponse>> {
        let mut session = controller.session.lock().await;
        session.regenerate().await?;
        Ok(Json(controller.snapshot(&session)))
    }

    /// POST /api/session/reject - Discard the current audio
    pub async fn reject(
        State(controller): State<Arc<SessionController>>,
    ) -> AppResult<Json<SessionResponse>> {
        let mut session = controller.session.lock().await;
        session.reject();
        Ok(Json(controller.snapshot(&session)))
    }

    /// POST /api/session/clear-text - Empty the text field
    pub async fn clear_text(
        State(controller): State<Arc<SessionController>>,
    ) -> AppResult<Json<SessionResponse>> {
        let mut session = controller.session.lock().await;
        session.clear_text();
        Ok(Json(controller.snapshot(&session)))
    }

    /// POST /api/session/save - Write the current take to the outputs directory
    pub async fn save(
        State(controller): State<Arc<SessionController>>,
    ) -> AppResult<(StatusCode, Json<HistoryEntry>)> {
        let mut session = controller.session.lock().await;
        let entry = session.save().await?;
        Ok((StatusCode::CREATED, Json(entry)))
    }

    /// GET /api/session/audio - Download the current take
    pub async fn download(
        State(controller): State<Arc<SessionController>>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let download = controller.session.lock().await.download()?;

        let disposition = HeaderValue::from_str(&content_disposition(&download.file_name))
            .map_err(|e| AppError::Internal(format!("Invalid download name: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(header::CONTENT_DISPOSITION, disposition);

        Ok((StatusCode::OK, headers, Body::from(download.audio)))
    }

    /// GET /api/session/history - Recent saved clips, newest first
    pub async fn history(
        State(controller): State<Arc<SessionController>>,
    ) -> AppResult<Json<Vec<HistoryEntry>>> {
        let session = controller.session.lock().await;
        Ok(Json(controller.snapshot(&session).history))
    }
}
