use essentials_core::language::Language;
use essentials_core::llm_client::{
    DEFAULT_API_BASE, DEFAULT_TEXT_MODEL, DEFAULT_TTS_MODEL, DEFAULT_VOICE, GeminiConfig,
};
use tracing::Level;

/// Royalty-free ambient track looped under the voice.
pub const DEFAULT_BACKGROUND_MUSIC_URL: &str =
    "https://cdn.pixabay.com/audio/2022/05/27/audio_1808fbf07a.mp3";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Missing is allowed: generation then falls back to static content and
    /// speech is unavailable.
    pub gemini_api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub tts_model: String,
    pub voice_name: String,
    pub background_music_url: String,
    pub language: Language,
    pub log_level: Level,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        let api_base = var_or("GEMINI_API_BASE", DEFAULT_API_BASE);
        let text_model = var_or("TEXT_MODEL", DEFAULT_TEXT_MODEL);
        let tts_model = var_or("TTS_MODEL", DEFAULT_TTS_MODEL);
        let voice_name = var_or("TTS_VOICE", DEFAULT_VOICE);

        let background_music_url = var_or("BACKGROUND_MUSIC_URL", DEFAULT_BACKGROUND_MUSIC_URL);
        if !background_music_url.starts_with("http://") && !background_music_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "BACKGROUND_MUSIC_URL".to_string(),
                format!("'{}' is not an http(s) URL", background_music_url),
            ));
        }

        let language_str = var_or("APP_LANGUAGE", "tr");
        let language = language_str
            .parse::<Language>()
            .map_err(|e| ConfigError::InvalidValue("APP_LANGUAGE".to_string(), e.to_string()))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            gemini_api_key,
            api_base,
            text_model,
            tts_model,
            voice_name,
            background_music_url,
            language,
            log_level,
        })
    }

    /// Requires the API credential, for commands that cannot work without it.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            api_base: self.api_base.clone(),
            text_model: self.text_model.clone(),
            tts_model: self.tts_model.clone(),
            voice_name: self.voice_name.clone(),
        }
    }
}
