pub mod error;
pub mod service;

pub use error::DictionaryError;
pub use service::{DictionaryCacheKey, DictionaryResolution, PronunciationDictionaryCache};

use serde::{Deserialize, Serialize};

/// Dictionary file the user wants applied to a synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionarySelection {
    pub path: std::path::PathBuf,
    pub name: String,
}
