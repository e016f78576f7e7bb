use crate::domain::tts::ModelId;
use crate::infrastructure::repositories::elevenlabs_tts_repository::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Key looked up in the secrets file
pub const SECRETS_API_KEY: &str = "elevenlabs_api_key";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Speech provider
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    pub default_model: ModelId,
    pub output_format: String,
    // Local storage
    pub outputs_dir: PathBuf,
    pub pronunciation_dictionary_path: PathBuf,
    pub pronunciation_dictionary_name: String,
    pub history_display_limit: usize,
    /// Problems found while loading, logged once logging is initialized
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let secrets_file =
            env::var("SECRETS_FILE").unwrap_or_else(|_| ".secrets.toml".to_string());
        let mut warnings = Vec::new();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            elevenlabs_api_key: resolve_api_key(
                env::var("ELEVENLABS_API_KEY").ok(),
                Path::new(&secrets_file),
                &mut warnings,
            ),
            elevenlabs_base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            default_model: env::var("ELEVENLABS_MODEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            output_format: env::var("ELEVENLABS_OUTPUT_FORMAT")
                .unwrap_or_else(|_| "mp3_44100_128".to_string()),
            outputs_dir: env::var("OUTPUTS_DIR")
                .unwrap_or_else(|_| "outputs".to_string())
                .into(),
            pronunciation_dictionary_path: env::var("PRONUNCIATION_DICTIONARY_PATH")
                .unwrap_or_else(|_| "dictionary.pls".to_string())
                .into(),
            pronunciation_dictionary_name: env::var("PRONUNCIATION_DICTIONARY_NAME")
                .unwrap_or_else(|_| "CustomPronunciations".to_string()),
            history_display_limit: env::var("HISTORY_DISPLAY_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            warnings,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Environment key first, overridden by a non-empty value in the secrets file
fn resolve_api_key(
    env_key: Option<String>,
    secrets_file: &Path,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let secret = read_secret(secrets_file, SECRETS_API_KEY).unwrap_or_else(|e| {
        warnings.push(e);
        None
    });

    secret
        .or(env_key)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Read one string value from a TOML secrets file. A missing file yields
/// nothing; a malformed one is an error.
fn read_secret(path: &Path, key: &str) -> Result<Option<String>, String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Ok(None);
    };
    let table = content.parse::<toml::Table>().map_err(|e| {
        format!(
            "Ignoring malformed secrets file {}: {}",
            path.display(),
            e
        )
    })?;

    Ok(table
        .get(key)
        .and_then(|value| value.as_str())
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string))
}
