use crate::domain::tts::TtsServiceError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    RemoteCall(String),
    #[error("no audio to save; generate a take first")]
    NoAudio,
    #[error("nothing to regenerate; generate a take first")]
    NothingToRegenerate,
    #[error("save failed: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl From<TtsServiceError> for SessionError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Validation(msg) => SessionError::Validation(msg),
            TtsServiceError::Configuration(msg) => SessionError::Configuration(msg),
            TtsServiceError::Synthesis(msg) | TtsServiceError::Upload(msg) => {
                SessionError::RemoteCall(msg)
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Configuration(msg) => AppError::Configuration(msg),
            SessionError::Validation(msg) => AppError::Validation(msg),
            SessionError::RemoteCall(msg) => AppError::RemoteCall(msg),
            SessionError::NoAudio | SessionError::NothingToRegenerate => {
                AppError::Conflict(err.to_string())
            }
            SessionError::Storage(e) => AppError::Storage(format!("{e:#}")),
        }
    }
}
