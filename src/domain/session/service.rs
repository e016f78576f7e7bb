use super::error::SessionError;
use super::model::{clip_file_name, download_file_name, HistoryEntry, SessionState};
use crate::domain::dictionary::{DictionarySelection, PronunciationDictionaryCache};
use crate::domain::tts::{
    ModelId, SynthesisParameters, SynthesisRequest, TtsService, TtsServiceApi, VoiceListing,
    VoiceSettings,
};
use crate::infrastructure::repositories::{ClipRepository, ProviderFactory};
use chrono::{Local, SubsecRound};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything the user picked before pressing Generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCommand {
    pub text: String,
    pub voice_id: String,
    #[serde(default)]
    pub model_id: ModelId,
    #[serde(default)]
    pub voice_settings: Option<VoiceSettings>,
    #[serde(default)]
    pub pronunciation_dictionary: Option<DictionarySelection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutcome {
    pub byte_length: usize,
    pub warnings: Vec<String>,
}

/// The current take packaged for a client-side download
#[derive(Debug, Clone)]
pub struct ClipDownload {
    pub file_name: String,
    pub audio: Vec<u8>,
}

/// Provider availability readable without taking the session lock, so
/// readiness checks answer while a synthesis is in flight
#[derive(Debug, Clone, Default)]
pub struct ProviderStatus(Arc<AtomicBool>);

impl ProviderStatus {
    pub fn is_available(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, available: bool) {
        self.0.store(available, Ordering::Release);
    }
}

/// Applies user actions to one session.
///
/// The provider adapter is rebuilt whenever the credential changes; the
/// dictionary cache and history survive credential changes.
pub struct SessionService {
    provider_factory: Arc<dyn ProviderFactory>,
    provider: TtsService,
    api_key: Option<String>,
    output_format: String,
    dictionary_cache: PronunciationDictionaryCache,
    clip_repo: Arc<ClipRepository>,
    state: SessionState,
    status: ProviderStatus,
}

impl SessionService {
    pub fn new(
        provider_factory: Arc<dyn ProviderFactory>,
        clip_repo: Arc<ClipRepository>,
        output_format: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let output_format = output_format.into();
        let mut service = Self {
            provider_factory,
            provider: TtsService::unavailable(output_format.clone()),
            api_key: None,
            output_format,
            dictionary_cache: PronunciationDictionaryCache::new(),
            clip_repo,
            state: SessionState::default(),
            status: ProviderStatus::default(),
        };
        service.set_api_key(api_key);
        service
    }

    /// Replace the credential; blank clears it
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let client = self
            .api_key
            .as_deref()
            .and_then(|key| self.provider_factory.connect(key));
        self.provider = TtsService::new(client, self.output_format.clone());
        self.status.set(self.provider.is_available());

        tracing::info!(
            has_credential = self.api_key.is_some(),
            provider_available = self.provider.is_available(),
            "Session credential updated"
        );
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn is_provider_available(&self) -> bool {
        self.provider.is_available()
    }

    /// Handle that tracks availability across credential changes
    pub fn provider_status(&self) -> ProviderStatus {
        self.status.clone()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub async fn list_voices(&self) -> VoiceListing {
        self.provider.list_voices().await
    }

    /// Synthesize a new take. On any failure the previous take is untouched.
    pub async fn generate(
        &mut self,
        command: GenerateCommand,
    ) -> Result<GenerateOutcome, SessionError> {
        if self.api_key.is_none() {
            return Err(SessionError::Configuration(
                "Please provide your ElevenLabs API key.".to_string(),
            ));
        }
        if command.voice_id.trim().is_empty() {
            return Err(SessionError::Configuration(
                "Please select or enter a Voice ID.".to_string(),
            ));
        }
        if command.text.trim().is_empty() {
            return Err(SessionError::Validation(
                "Enter some text to synthesize.".to_string(),
            ));
        }

        let mut warnings = Vec::new();
        let pronunciation_locators = match &command.pronunciation_dictionary {
            Some(selection) => {
                let resolution = self
                    .dictionary_cache
                    .resolve_or_warn(&self.provider, selection)
                    .await;
                warnings.extend(resolution.warning);
                resolution.locators
            }
            None => None,
        };

        let request = SynthesisRequest {
            text: command.text,
            voice_id: command.voice_id.trim().to_string(),
            model_id: command.model_id,
            voice_settings: command.voice_settings,
            pronunciation_locators,
        };

        tracing::info!(voice_id = %request.voice_id, "Generating audio");
        let audio = self.provider.synthesize(&request).await?;
        let byte_length = audio.len();

        let parameters = SynthesisParameters::from(&request);
        self.state.accept_take(audio, request.text, parameters);

        Ok(GenerateOutcome {
            byte_length,
            warnings,
        })
    }

    /// Synthesize the stored text again with the stored parameters
    pub async fn regenerate(&mut self) -> Result<usize, SessionError> {
        let request = self
            .state
            .current_parameters()
            .ok_or(SessionError::NothingToRegenerate)?
            .to_request(self.state.current_text());

        tracing::info!(voice_id = %request.voice_id, "Regenerating audio");
        let audio = self.provider.synthesize(&request).await?;
        let byte_length = audio.len();
        self.state.replace_audio(audio);

        Ok(byte_length)
    }

    pub fn reject(&mut self) {
        self.state.reject();
        tracing::info!("Audio discarded");
    }

    pub fn clear_text(&mut self) {
        self.state.clear_text();
    }

    /// Write the current take to disk and record it in the history
    pub async fn save(&mut self) -> Result<HistoryEntry, SessionError> {
        let audio = self.state.current_audio().ok_or(SessionError::NoAudio)?;
        let saved_at = Local::now().trunc_subsecs(0);
        let file_name = clip_file_name(self.state.current_text(), &saved_at);

        let storage_path = self.clip_repo.write_clip(&file_name, audio).await?;

        let entry = HistoryEntry {
            display_name: file_name,
            storage_path,
            byte_length: audio.len(),
            timestamp: saved_at,
        };
        self.state.record_saved(entry.clone());

        Ok(entry)
    }

    pub fn download(&self) -> Result<ClipDownload, SessionError> {
        let audio = self.state.current_audio().ok_or(SessionError::NoAudio)?;
        Ok(ClipDownload {
            file_name: download_file_name(self.state.current_text()),
            audio: audio.to_vec(),
        })
    }
}
