use anyhow::Context;
use std::path::{Path, PathBuf};

/// Stores saved clips as files under a single output directory
pub struct ClipRepository {
    outputs_dir: PathBuf,
}

impl ClipRepository {
    pub fn new(outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            outputs_dir: outputs_dir.into(),
        }
    }

    pub fn outputs_dir(&self) -> &Path {
        &self.outputs_dir
    }

    /// Write audio under `file_name`, creating the directory on demand.
    /// An existing file with the same name is truncated.
    pub async fn write_clip(&self, file_name: &str, audio: &[u8]) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.outputs_dir)
            .await
            .with_context(|| {
                format!(
                    "could not create output directory {}",
                    self.outputs_dir.display()
                )
            })?;

        let path = self.outputs_dir.join(file_name);
        tokio::fs::write(&path, audio)
            .await
            .with_context(|| format!("could not write {}", path.display()))?;

        tracing::info!(path = %path.display(), size = audio.len(), "Clip written");

        Ok(path)
    }
}
