use super::tts_repository::{ProviderFactory, TtsRepository};
use crate::domain::tts::{PronunciationLocator, SynthesisRequest, Voice, VoiceSettings};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

const API_KEY_HEADER: &str = "xi-api-key";
const VOICES_PATH: &str = "/v1/voices";
const TEXT_TO_SPEECH_PATH: &str = "/v1/text-to-speech";
const ADD_DICTIONARY_PATH: &str = "/v1/pronunciation-dictionaries/add-from-file";

#[derive(Debug, Deserialize)]
struct ListVoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceResponse>,
}

#[derive(Debug, Deserialize)]
struct VoiceResponse {
    voice_id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct ConvertRequestBody<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<&'a VoiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pronunciation_dictionary_locators: Option<&'a [PronunciationLocator]>,
}

#[derive(Debug, Deserialize)]
struct AddDictionaryResponse {
    id: String,
    #[serde(default)]
    version_id: Option<String>,
}

/// ElevenLabs implementation of TTS repository
pub struct ElevenLabsTtsRepository {
    http_client: reqwest::Client,
    base_url: String,
}

impl ElevenLabsTtsRepository {
    pub fn new(api_key: &str, base_url: impl Into<String>) -> Result<Self, String> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| "API key contains characters not allowed in a header".to_string())?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into an error message carrying the body
    async fn error_from_response(context: &str, response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        format!("{} ({}): {}", context, status, body)
    }
}

#[async_trait]
impl TtsRepository for ElevenLabsTtsRepository {
    async fn list_voices(&self) -> Result<Vec<Voice>, String> {
        let response = self
            .http_client
            .get(self.url(VOICES_PATH))
            .send()
            .await
            .map_err(|e| format!("Voice list request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("Voice list request failed", response).await);
        }

        let payload: ListVoicesResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse voice list: {}", e))?;

        // Entries without an id cannot be used for synthesis
        Ok(payload
            .voices
            .into_iter()
            .filter_map(|v| {
                Some(Voice {
                    voice_id: v.voice_id?,
                    name: v.name.unwrap_or_else(|| "Unnamed".to_string()),
                    labels: v.labels,
                })
            })
            .collect())
    }

    async fn convert(
        &self,
        request: &SynthesisRequest,
        output_format: &str,
    ) -> Result<Vec<u8>, String> {
        let body = ConvertRequestBody {
            text: &request.text,
            model_id: request.model_id.as_str(),
            voice_settings: request.voice_settings.as_ref(),
            pronunciation_dictionary_locators: request.pronunciation_locators.as_deref(),
        };

        let response = self
            .http_client
            .post(self.url(&format!("{}/{}", TEXT_TO_SPEECH_PATH, request.voice_id)))
            .query(&[("output_format", output_format)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    voice_id = %request.voice_id,
                    model_id = %request.model_id,
                    "ElevenLabs TTS call failed"
                );
                format!("ElevenLabs TTS error: {}", e)
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("ElevenLabs TTS error", response).await);
        }

        let mut audio = Vec::new();
        let mut chunks = 0usize;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("Audio stream interrupted: {}", e))?;
            audio.extend_from_slice(&chunk);
            chunks += 1;
        }

        tracing::debug!(chunks, audio_size = audio.len(), "Audio stream collected");

        Ok(audio)
    }

    async fn add_dictionary_from_file(
        &self,
        name: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<PronunciationLocator, String> {
        let file = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("application/pls+xml")
            .map_err(|e| format!("Invalid dictionary upload: {}", e))?;
        let form = Form::new().text("name", name.to_string()).part("file", file);

        let response = self
            .http_client
            .post(self.url(ADD_DICTIONARY_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Dictionary upload failed: {}", e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("Dictionary upload failed", response).await);
        }

        let created: AddDictionaryResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse dictionary response: {}", e))?;

        Ok(PronunciationLocator {
            pronunciation_dictionary_id: created.id,
            version_id: created.version_id,
        })
    }
}

/// Builds ElevenLabs clients against a fixed base URL
pub struct ElevenLabsProviderFactory {
    base_url: String,
}

impl ElevenLabsProviderFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl ProviderFactory for ElevenLabsProviderFactory {
    fn connect(&self, api_key: &str) -> Option<Arc<dyn TtsRepository>> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return None;
        }

        match ElevenLabsTtsRepository::new(api_key, self.base_url.clone()) {
            Ok(repo) => Some(Arc::new(repo)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize ElevenLabs client");
                None
            }
        }
    }
}
