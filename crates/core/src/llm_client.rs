//! Client for the Gemini `generateContent` REST endpoint.
//!
//! Two request shapes are used: a structured-output text request and an
//! audio-only speech request. Both go through the `GenAiClient` trait so the
//! generator and synthesizer can be exercised against a mock.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Kore";

/// A generic client for a generative-AI endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenAiClient: Send + Sync {
    /// Whether an API credential is configured. Callers skip the network
    /// entirely when this is `false`.
    fn has_credential(&self) -> bool;

    /// Requests a JSON response constrained by `response_schema`.
    ///
    /// Returns the raw response text, or `None` if the endpoint produced no text.
    async fn generate_structured(
        &self,
        prompt: String,
        response_schema: serde_json::Value,
    ) -> Result<Option<String>>;

    /// Requests audio-only output for `prompt` with the configured voice.
    ///
    /// Returns the base64 inline audio payload, or `None` if there was none.
    async fn generate_speech(&self, prompt: String) -> Result<Option<String>>;
}

// --- Local Gemini REST types ---
mod gemini_types {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct GenerateContentRequest {
        pub contents: Vec<Content>,
        pub generation_config: GenerationConfig,
    }
    #[derive(Serialize)]
    pub(super) struct Content {
        pub parts: Vec<Part>,
    }
    #[derive(Serialize)]
    pub(super) struct Part {
        pub text: String,
    }
    #[derive(Serialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct GenerationConfig {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub response_mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub response_json_schema: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub response_modalities: Option<Vec<ResponseModality>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub speech_config: Option<SpeechConfig>,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub(super) enum ResponseModality {
        Audio,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct SpeechConfig {
        pub voice_config: VoiceConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct VoiceConfig {
        pub prebuilt_voice_config: PrebuiltVoiceConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct PrebuiltVoiceConfig {
        pub voice_name: String,
    }

    #[derive(Deserialize, Debug)]
    pub(super) struct GenerateContentResponse {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct Candidate {
        pub content: Option<CandidateContent>,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct CandidateContent {
        #[serde(default)]
        pub parts: Vec<ResponsePart>,
    }
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ResponsePart {
        pub text: Option<String>,
        pub inline_data: Option<Blob>,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct Blob {
        pub data: String,
    }

    impl GenerateContentResponse {
        fn first_parts(&self) -> &[ResponsePart] {
            self.candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|c| c.parts.as_slice())
                .unwrap_or_default()
        }

        /// Concatenated text of the first candidate, `None` if there is none.
        pub fn text(&self) -> Option<String> {
            let text: String = self
                .first_parts()
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect();
            if text.is_empty() { None } else { Some(text) }
        }

        /// Inline data of the first candidate's first part.
        pub fn inline_audio(self) -> Option<String> {
            self.candidates
                .into_iter()
                .next()?
                .content?
                .parts
                .into_iter()
                .next()?
                .inline_data
                .map(|blob| blob.data)
        }
    }
}

use gemini_types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    PrebuiltVoiceConfig, ResponseModality, SpeechConfig, VoiceConfig,
};

/// Connection settings for `GeminiClient`.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub tts_model: String,
    pub voice_name: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice_name: DEFAULT_VOICE.to_string(),
        }
    }
}

/// An implementation of `GenAiClient` for the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .context("Gemini API key is not configured")?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .context("Request to Gemini failed")?
            .error_for_status()
            .context("Gemini returned an error status")?;

        let body = response
            .json::<GenerateContentResponse>()
            .await
            .context("Failed to parse Gemini response body")?;
        debug!(candidates = body.candidates.len(), "Gemini response received");
        Ok(body)
    }
}

fn single_turn(prompt: String) -> Vec<Content> {
    vec![Content {
        parts: vec![Part { text: prompt }],
    }]
}

#[async_trait]
impl GenAiClient for GeminiClient {
    fn has_credential(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    #[instrument(skip_all, fields(model = %self.config.text_model))]
    async fn generate_structured(
        &self,
        prompt: String,
        response_schema: serde_json::Value,
    ) -> Result<Option<String>> {
        let request = GenerateContentRequest {
            contents: single_turn(prompt),
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_json_schema: Some(response_schema),
                ..Default::default()
            },
        };
        let response = self
            .generate_content(&self.config.text_model, &request)
            .await?;
        Ok(response.text())
    }

    #[instrument(skip_all, fields(model = %self.config.tts_model, voice = %self.config.voice_name))]
    async fn generate_speech(&self, prompt: String) -> Result<Option<String>> {
        let request = GenerateContentRequest {
            contents: single_turn(prompt),
            generation_config: GenerationConfig {
                response_modalities: Some(vec![ResponseModality::Audio]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.config.voice_name.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        };
        let response = self
            .generate_content(&self.config.tts_model, &request)
            .await?;
        Ok(response.inline_audio())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_request_serialization() {
        let request = GenerateContentRequest {
            contents: single_turn("hello".to_string()),
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_json_schema: Some(json!({"type": "object"})),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"parts": [{"text": "hello"}]}],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseJsonSchema": {"type": "object"}
                }
            })
        );
    }

    #[test]
    fn test_speech_request_serialization() {
        let request = GenerateContentRequest {
            contents: single_turn("read this".to_string()),
            generation_config: GenerationConfig {
                response_modalities: Some(vec![ResponseModality::Audio]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: "Kore".to_string(),
                        },
                    },
                }),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["generationConfig"]["responseModalities"], json!(["AUDIO"]));
        assert_eq!(
            value["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert!(value["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        }))
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_response_without_candidates() {
        let body: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(body.text().is_none());
        assert!(body.inline_audio().is_none());
    }

    #[test]
    fn test_response_inline_audio() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "audio/L16;rate=24000", "data": "AAAA"}}
            ]}}]
        }))
        .unwrap();
        assert!(body.text().is_none());
        assert_eq!(body.inline_audio().as_deref(), Some("AAAA"));
    }

    #[test]
    fn test_has_credential() {
        let client = GeminiClient::new(GeminiConfig::default());
        assert!(!client.has_credential());

        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(!client.has_credential());

        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        });
        assert!(client.has_credential());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = GeminiClient::new(GeminiConfig::default());
        let err = client
            .generate_speech("anything".to_string())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}
