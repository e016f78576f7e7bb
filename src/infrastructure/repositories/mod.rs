pub mod clip_repository;
pub mod elevenlabs_tts_repository;
pub mod tts_repository;

pub use clip_repository::ClipRepository;
pub use elevenlabs_tts_repository::{ElevenLabsProviderFactory, ElevenLabsTtsRepository};
pub use tts_repository::{ProviderFactory, TtsRepository};
