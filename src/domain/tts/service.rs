use super::error::TtsServiceError;
use super::model::{PronunciationLocator, SynthesisRequest, Voice};
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Voices for the current credential. Listing never fails: problems are
/// reported through `warning` next to an empty list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VoiceListing {
    pub voices: Vec<Voice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Adapter over the speech provider. Built with or without a client; without
/// one every remote operation reports a configuration problem.
pub struct TtsService {
    tts_repo: Option<Arc<dyn TtsRepository>>,
    output_format: String,
}

impl TtsService {
    pub fn new(tts_repo: Option<Arc<dyn TtsRepository>>, output_format: impl Into<String>) -> Self {
        Self {
            tts_repo,
            output_format: output_format.into(),
        }
    }

    /// An adapter that has no client to talk to
    pub fn unavailable(output_format: impl Into<String>) -> Self {
        Self::new(None, output_format)
    }

    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    fn client(&self) -> Result<&Arc<dyn TtsRepository>, TtsServiceError> {
        self.tts_repo.as_ref().ok_or_else(|| {
            TtsServiceError::Configuration(
                "No speech provider client available. Provide an API key.".to_string(),
            )
        })
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Whether a provider client is configured
    fn is_available(&self) -> bool;

    /// List voices, degrading to an empty list with a warning on any failure
    async fn list_voices(&self) -> VoiceListing;

    /// Synthesize text to speech
    ///
    /// This operation:
    /// - Rejects blank text before anything else
    /// - Rejects out-of-range voice settings
    /// - Requires a provider client
    /// - Returns the whole audio body as one buffer
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, TtsServiceError>;

    /// Upload a pronunciation dictionary file and return its locator
    async fn upload_dictionary(
        &self,
        name: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<PronunciationLocator, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    fn is_available(&self) -> bool {
        self.tts_repo.is_some()
    }

    async fn list_voices(&self) -> VoiceListing {
        let Some(repo) = &self.tts_repo else {
            return VoiceListing {
                voices: Vec::new(),
                warning: Some("Provide an API key to load your voices.".to_string()),
            };
        };

        match repo.list_voices().await {
            Ok(voices) => {
                tracing::debug!(voice_count = voices.len(), "Voice list fetched");
                VoiceListing {
                    voices,
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch voice list");
                VoiceListing {
                    voices: Vec::new(),
                    warning: Some(format!("Could not fetch voice list: {}", e)),
                }
            }
        }
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, TtsServiceError> {
        if !request.has_text() {
            return Err(TtsServiceError::Validation(
                "Enter some text to synthesize.".to_string(),
            ));
        }

        if let Some(settings) = &request.voice_settings {
            settings.validate().map_err(TtsServiceError::Validation)?;
        }

        let repo = self.client()?;

        tracing::info!(
            voice_id = %request.voice_id,
            model_id = %request.model_id,
            output_format = %self.output_format,
            text_length = request.text.len(),
            custom_settings = request.voice_settings.is_some(),
            locator_count = request.pronunciation_locators.as_ref().map_or(0, Vec::len),
            "TTS synthesis request"
        );

        let audio = repo
            .convert(request, &self.output_format)
            .await
            .map_err(TtsServiceError::Synthesis)?;

        tracing::info!(audio_size = audio.len(), "TTS synthesis completed");

        Ok(audio)
    }

    async fn upload_dictionary(
        &self,
        name: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<PronunciationLocator, TtsServiceError> {
        let repo = self.client()?;

        tracing::info!(
            dictionary_name = name,
            file_name = file_name,
            size = content.len(),
            "Uploading pronunciation dictionary"
        );

        repo.add_dictionary_from_file(name, file_name, content)
            .await
            .map_err(TtsServiceError::Upload)
    }
}
