use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not configured: {0}")]
    Configuration(String),
    #[error("synthesis failed: {0}")]
    Synthesis(String),
    #[error("dictionary upload failed: {0}")]
    Upload(String),
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Validation(msg) => AppError::Validation(msg),
            TtsServiceError::Configuration(msg) => AppError::Configuration(msg),
            TtsServiceError::Synthesis(msg) | TtsServiceError::Upload(msg) => {
                AppError::RemoteCall(msg)
            }
        }
    }
}
