use crate::domain::shared::{sanitize_filename, DEFAULT_MAX_LENGTH, PLACEHOLDER_NAME};
use crate::domain::tts::SynthesisParameters;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// Characters of the take's text used to name saved and downloaded files
pub const NAME_PREFIX_CHARS: usize = 24;

pub const SAVE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

pub const AUDIO_EXTENSION: &str = "mp3";

/// One clip written to disk during this session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub display_name: String,
    pub storage_path: PathBuf,
    pub byte_length: usize,
    pub timestamp: DateTime<Local>,
}

/// State of one interactive session: the current take and saved clips.
///
/// Audio, text and parameters of a take are only ever replaced together,
/// except that Regenerate swaps the audio and Reject drops it.
#[derive(Debug, Default)]
pub struct SessionState {
    current_audio: Option<Vec<u8>>,
    current_text: String,
    current_parameters: Option<SynthesisParameters>,
    history: Vec<HistoryEntry>,
}

impl SessionState {
    pub fn current_audio(&self) -> Option<&[u8]> {
        self.current_audio.as_deref()
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn current_parameters(&self) -> Option<&SynthesisParameters> {
        self.current_parameters.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Install a freshly generated take
    pub fn accept_take(&mut self, audio: Vec<u8>, text: String, parameters: SynthesisParameters) {
        self.current_audio = Some(audio);
        self.current_text = text;
        self.current_parameters = Some(parameters);
    }

    pub fn replace_audio(&mut self, audio: Vec<u8>) {
        self.current_audio = Some(audio);
    }

    pub fn reject(&mut self) {
        self.current_audio = None;
    }

    pub fn clear_text(&mut self) {
        self.current_text.clear();
    }

    pub fn record_saved(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// The last `limit` saved clips, newest first. Older entries are kept.
    pub fn recent_history(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter().rev().take(limit)
    }
}

fn name_seed(text: &str) -> String {
    let prefix: String = text.chars().take(NAME_PREFIX_CHARS).collect();
    if prefix.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        prefix
    }
}

/// `<sanitized base>-<YYYYMMDD-HHMMSS>.mp3` for a clip saved at `saved_at`
pub fn clip_file_name(text: &str, saved_at: &DateTime<Local>) -> String {
    let base = sanitize_filename(&name_seed(text), DEFAULT_MAX_LENGTH, None);
    format!(
        "{}-{}.{}",
        base,
        saved_at.format(SAVE_TIMESTAMP_FORMAT),
        AUDIO_EXTENSION
    )
}

/// File name offered when the current take is downloaded
pub fn download_file_name(text: &str) -> String {
    sanitize_filename(&name_seed(text), DEFAULT_MAX_LENGTH, Some(AUDIO_EXTENSION))
}
