use super::error::DictionaryError;
use super::DictionarySelection;
use crate::domain::tts::{PronunciationLocator, TtsServiceApi};
use moka::future::Cache;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

const FALLBACK_FILE_NAME: &str = "dictionary.pls";

/// Identity of one dictionary file state. The modification time makes an
/// edited file upload again; it is only as precise as the filesystem clock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DictionaryCacheKey {
    pub path: PathBuf,
    pub name: String,
    pub modified_nanos: u128,
}

impl DictionaryCacheKey {
    /// Build the key from the file's current modification time, 0 if unreadable
    pub async fn for_file(path: &Path, name: &str) -> Self {
        let modified_nanos = tokio::fs::metadata(path)
            .await
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or(0);

        Self {
            path: path.to_path_buf(),
            name: name.to_string(),
            modified_nanos,
        }
    }
}

/// Locators to apply plus a warning when the dictionary had to be skipped
#[derive(Debug, Clone, Default)]
pub struct DictionaryResolution {
    pub locators: Option<Vec<PronunciationLocator>>,
    pub warning: Option<String>,
}

/// Session-scoped memo of uploaded pronunciation dictionaries.
///
/// Entries are never evicted: the cache lives as long as the session and
/// grows only with the distinct file states a user touches.
pub struct PronunciationDictionaryCache {
    cache: Cache<DictionaryCacheKey, PronunciationLocator>,
}

impl Default for PronunciationDictionaryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PronunciationDictionaryCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    /// Return the locator for this file state, uploading it on first use
    pub async fn resolve(
        &self,
        provider: &dyn TtsServiceApi,
        path: &Path,
        name: &str,
    ) -> Result<PronunciationLocator, DictionaryError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(DictionaryError::NotFound(path.to_path_buf()));
        }
        if !provider.is_available() {
            return Err(DictionaryError::NoClient);
        }

        let key = DictionaryCacheKey::for_file(path, name).await;
        if let Some(locator) = self.cache.get(&key).await {
            tracing::debug!(
                path = %path.display(),
                dictionary_name = name,
                dictionary_id = %locator.pronunciation_dictionary_id,
                "Pronunciation dictionary cache hit"
            );
            return Ok(locator);
        }

        let content = tokio::fs::read(path)
            .await
            .map_err(|source| DictionaryError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FALLBACK_FILE_NAME);

        let locator = provider
            .upload_dictionary(name, file_name, content)
            .await?;

        tracing::info!(
            dictionary_name = name,
            dictionary_id = %locator.pronunciation_dictionary_id,
            version_id = ?locator.version_id,
            "Using pronunciation dictionary for this session"
        );

        self.cache.insert(key, locator.clone()).await;
        Ok(locator)
    }

    /// Resolve a selection, turning any failure into a warning and no locators
    pub async fn resolve_or_warn(
        &self,
        provider: &dyn TtsServiceApi,
        selection: &DictionarySelection,
    ) -> DictionaryResolution {
        match self.resolve(provider, &selection.path, &selection.name).await {
            Ok(locator) => DictionaryResolution {
                locators: Some(vec![locator]),
                warning: None,
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %selection.path.display(),
                    "Pronunciation dictionary skipped"
                );
                DictionaryResolution {
                    locators: None,
                    warning: Some(format!("Could not use PLS dictionary: {}", e)),
                }
            }
        }
    }
}
