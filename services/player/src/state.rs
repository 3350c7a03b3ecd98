//! Shared Application State
//!
//! Wires the Gemini client, generator, synthesizer and playback controller
//! into one `ExperienceSession`.

use crate::config::Config;
use essentials_core::{
    Notice,
    generator::{ExperienceGenerator, LLMExperienceGenerator, MockExperienceGenerator},
    llm_client::{GeminiClient, GenAiClient},
    playback::{PlaybackController, output::AudioBackend},
    session::ExperienceSession,
    speech::{LLMSpeechSynthesizer, SpeechSynthesizer},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Application state created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub session: ExperienceSession,
}

impl AppState {
    /// Builds the pipeline. With `offline` set, experiences come from the
    /// static generator and never touch the network.
    pub fn new(
        config: &Config,
        backend: Arc<dyn AudioBackend>,
        notices: mpsc::Sender<Notice>,
        offline: bool,
    ) -> Self {
        if let Err(e) = config.require_api_key() {
            warn!(error = %e, "Experiences will use fallback content and speech is unavailable");
        }
        let client: Arc<dyn GenAiClient> = Arc::new(GeminiClient::new(config.gemini()));

        let generator: Arc<dyn ExperienceGenerator> = if offline {
            info!("Using offline experience generator.");
            Arc::new(MockExperienceGenerator)
        } else {
            Arc::new(LLMExperienceGenerator::new(client.clone()))
        };
        let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(LLMSpeechSynthesizer::new(client));

        let playback = Arc::new(PlaybackController::new(
            backend,
            synthesizer,
            Some(notices),
        ));
        let session = ExperienceSession::new(generator, playback, config.language);

        Self { session }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RodioBackend;
    use crate::config::DEFAULT_BACKGROUND_MUSIC_URL;
    use essentials_core::{catalog, language::Language, session::GenerationState};
    use essentials_core::llm_client::{
        DEFAULT_API_BASE, DEFAULT_TEXT_MODEL, DEFAULT_TTS_MODEL, DEFAULT_VOICE,
    };
    use tracing::Level;

    fn config(language: Language) -> Config {
        Config {
            gemini_api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice_name: DEFAULT_VOICE.to_string(),
            background_music_url: DEFAULT_BACKGROUND_MUSIC_URL.to_string(),
            language,
            log_level: Level::INFO,
        }
    }

    fn backend() -> Arc<dyn AudioBackend> {
        Arc::new(RodioBackend::new(None, DEFAULT_BACKGROUND_MUSIC_URL.to_string()))
    }

    #[tokio::test]
    async fn test_offline_state_uses_principle_title() {
        let (tx, _rx) = mpsc::channel(8);
        let state = AppState::new(&config(Language::En), backend(), tx, true);

        let principle = catalog::principle(Language::En, 3).unwrap();
        assert_eq!(state.session.select(principle).await, GenerationState::Ready);

        let snapshot = state.session.snapshot().await;
        assert_eq!(snapshot.language, Language::En);
        assert_eq!(snapshot.experience.unwrap().title, "Variation");
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_without_network() {
        let (tx, _rx) = mpsc::channel(8);
        let state = AppState::new(&config(Language::De), backend(), tx, false);

        let principle = catalog::principle(Language::De, 1).unwrap();
        assert_eq!(state.session.select(principle).await, GenerationState::Ready);

        let snapshot = state.session.snapshot().await;
        assert_eq!(snapshot.experience.unwrap(), Language::De.fallback_experience());
    }

    #[tokio::test]
    async fn test_missing_key_playback_sends_one_notice() {
        let (tx, mut rx) = mpsc::channel(8);
        let state = AppState::new(&config(Language::En), backend(), tx, true);
        state
            .session
            .select(catalog::principle(Language::En, 2).unwrap())
            .await;

        assert!(state.session.play().await.is_err());
        match rx.try_recv() {
            Ok(Notice::PlaybackFailed { message }) => {
                assert_eq!(message, Language::En.config().ui.playback_error)
            }
            other => panic!("expected a playback notice, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }
}
