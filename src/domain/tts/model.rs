use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Synthesis models offered by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    /// Best quality, the default
    #[default]
    #[serde(rename = "eleven_multilingual_v2")]
    MultilingualV2,
    /// Lower latency
    #[serde(rename = "eleven_flash_v2")]
    FlashV2,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::MultilingualV2, ModelId::FlashV2];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::MultilingualV2 => "eleven_multilingual_v2",
            ModelId::FlashV2 => "eleven_flash_v2",
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| format!("unknown model id: {s}"))
    }
}

/// Full voice behavior override. Either every knob is set or the provider
/// defaults apply, so there is no partially populated form of this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub speed: f32,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

impl VoiceSettings {
    pub const SPEED_RANGE: (f32, f32) = (0.5, 2.0);
    pub const UNIT_RANGE: (f32, f32) = (0.0, 1.0);

    /// Check every knob against the range the provider accepts
    pub fn validate(&self) -> Result<(), String> {
        check_range("speed", self.speed, Self::SPEED_RANGE)?;
        check_range("stability", self.stability, Self::UNIT_RANGE)?;
        check_range("similarity_boost", self.similarity_boost, Self::UNIT_RANGE)?;
        check_range("style", self.style, Self::UNIT_RANGE)?;
        Ok(())
    }
}

fn check_range(name: &str, value: f32, (min, max): (f32, f32)) -> Result<(), String> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} must be between {min} and {max}, got {value}"))
    }
}

/// A pronunciation dictionary pinned to one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationLocator {
    pub pronunciation_dictionary_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// A voice available to the current credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Everything needed for one synthesis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: ModelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_locators: Option<Vec<PronunciationLocator>>,
}

impl SynthesisRequest {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// The text-free part of a request, kept as plain values so an equivalent
/// request can be rebuilt later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParameters {
    pub voice_id: String,
    pub model_id: ModelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_locators: Option<Vec<PronunciationLocator>>,
}

impl SynthesisParameters {
    pub fn to_request(&self, text: impl Into<String>) -> SynthesisRequest {
        SynthesisRequest {
            text: text.into(),
            voice_id: self.voice_id.clone(),
            model_id: self.model_id,
            voice_settings: self.voice_settings,
            pronunciation_locators: self.pronunciation_locators.clone(),
        }
    }
}

impl From<&SynthesisRequest> for SynthesisParameters {
    fn from(request: &SynthesisRequest) -> Self {
        Self {
            voice_id: request.voice_id.clone(),
            model_id: request.model_id,
            voice_settings: request.voice_settings,
            pronunciation_locators: request.pronunciation_locators.clone(),
        }
    }
}
