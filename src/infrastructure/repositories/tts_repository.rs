use crate::domain::tts::{PronunciationLocator, SynthesisRequest, Voice};
use async_trait::async_trait;
use std::sync::Arc;

/// Repository for speech provider operations.
/// Abstracts the remote text-to-speech API so the domain only ever sees
/// plain records, never provider SDK types.
///
/// Implementations are responsible for:
/// - Authenticating against the provider
/// - Mapping domain requests onto the provider's wire format
/// - Collecting chunked audio responses into a single buffer
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// List the voices available to the configured credential
    async fn list_voices(&self) -> Result<Vec<Voice>, String>;

    /// Synthesize a request into encoded audio in the given output format
    ///
    /// # Errors
    /// Returns error if the transport fails or the provider rejects the request
    async fn convert(&self, request: &SynthesisRequest, output_format: &str)
        -> Result<Vec<u8>, String>;

    /// Upload a pronunciation lexicon file as a new dictionary
    async fn add_dictionary_from_file(
        &self,
        name: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<PronunciationLocator, String>;
}

/// Builds provider clients on demand from an API key.
///
/// Returning `None` means no client is available for that key, and the
/// adapter built on top of it reports itself as unavailable.
pub trait ProviderFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Option<Arc<dyn TtsRepository>>;
}
