//! Speech synthesis for generated experiences.

use crate::language::Language;
use crate::llm_client::GenAiClient;
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Produces raw PCM16 speech audio for a piece of text.
///
/// Absence of audio is an expected outcome, not an error: callers must check
/// for `None` and skip voice playback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: String, language: Language) -> Option<Vec<u8>>;
}

/// Wraps the experience text in the language's slow, gentle tone instruction.
pub fn build_speech_prompt(text: &str, language: Language) -> String {
    format!("{} \"{}\"", language.config().tone_instruction, text)
}

/// A `SpeechSynthesizer` backed by a generative-AI client's audio output.
pub struct LLMSpeechSynthesizer {
    client: Arc<dyn GenAiClient>,
}

impl LLMSpeechSynthesizer {
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechSynthesizer for LLMSpeechSynthesizer {
    async fn synthesize(&self, text: String, language: Language) -> Option<Vec<u8>> {
        if !self.client.has_credential() {
            error!("API credential not found for speech synthesis");
            return None;
        }

        let payload = match self
            .client
            .generate_speech(build_speech_prompt(&text, language))
            .await
        {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                warn!(%language, "Speech response contained no audio payload");
                return None;
            }
            Err(e) => {
                error!(%language, error = ?e, "Speech synthesis request failed");
                return None;
            }
        };

        match base64::engine::general_purpose::STANDARD.decode(payload) {
            Ok(bytes) => {
                info!(%language, bytes = bytes.len(), "Speech audio received");
                Some(bytes)
            }
            Err(e) => {
                error!(error = %e, "Failed to decode base64 speech payload");
                None
            }
        }
    }
}
