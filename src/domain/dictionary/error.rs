use crate::domain::tts::TtsServiceError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("PLS file not found at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Provide an API key to upload/use a pronunciation dictionary.")]
    NoClient,
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Provider(#[from] TtsServiceError),
}
