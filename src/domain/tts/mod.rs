pub mod error;
pub mod model;
pub mod service;

pub use error::TtsServiceError;
pub use model::{
    ModelId, PronunciationLocator, SynthesisParameters, SynthesisRequest, Voice, VoiceSettings,
};
pub use service::{TtsService, TtsServiceApi, VoiceListing};
