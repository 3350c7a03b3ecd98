//! Experience Session
//!
//! Coordinates generation and playback for one interaction with a principle.
//! Generation moves through `Idle → Loading → Ready | Error`, while playback
//! runs as an orthogonal sub-state owned by the `PlaybackController`.

use crate::experience::{GeneratedExperience, Principle};
use crate::generator::ExperienceGenerator;
use crate::language::Language;
use crate::playback::{PlaybackController, PlaybackError, PlaybackState};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Delay between closing a session and clearing its content, so the closing
/// transition can still show it.
pub const CLOSE_TRANSITION_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Point-in-time view of a session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub language: Language,
    pub generation: GenerationState,
    pub playback: PlaybackState,
    pub principle: Option<Principle>,
    pub experience: Option<GeneratedExperience>,
}

struct SessionInner {
    language: Language,
    generation: GenerationState,
    principle: Option<Principle>,
    experience: Option<GeneratedExperience>,
    /// Identifies the latest select/close so stale results can be dropped.
    request_id: u64,
}

#[derive(Clone)]
pub struct ExperienceSession {
    generator: Arc<dyn ExperienceGenerator>,
    playback: Arc<PlaybackController>,
    inner: Arc<Mutex<SessionInner>>,
}

impl ExperienceSession {
    pub fn new(
        generator: Arc<dyn ExperienceGenerator>,
        playback: Arc<PlaybackController>,
        language: Language,
    ) -> Self {
        Self {
            generator,
            playback,
            inner: Arc::new(Mutex::new(SessionInner {
                language,
                generation: GenerationState::Idle,
                principle: None,
                experience: None,
                request_id: 0,
            })),
        }
    }

    pub fn playback(&self) -> &Arc<PlaybackController> {
        &self.playback
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            language: inner.language,
            generation: inner.generation,
            playback: self.playback.state(),
            principle: inner.principle.clone(),
            experience: inner.experience.clone(),
        }
    }

    /// Changes the language used by subsequent selections and playback.
    pub async fn set_language(&self, language: Language) {
        self.inner.lock().await.language = language;
    }

    /// Selects a principle and generates its experience.
    ///
    /// Any previous experience is cleared and playback stopped. Resolves once
    /// generation has finished; a result that was superseded by a newer
    /// selection or a close is discarded.
    pub async fn select(&self, principle: Principle) -> GenerationState {
        let (request_id, language) = {
            let mut inner = self.inner.lock().await;
            inner.request_id += 1;
            inner.generation = GenerationState::Loading;
            inner.principle = Some(principle.clone());
            inner.experience = None;
            (inner.request_id, inner.language)
        };
        self.playback.stop().await;
        info!(principle_id = principle.id, %language, "Principle selected");

        let generator = self.generator.clone();
        let result =
            tokio::spawn(async move { generator.generate(&principle, language).await }).await;

        let mut inner = self.inner.lock().await;
        if inner.request_id != request_id {
            debug!(request_id, "Ignoring superseded generation result");
            return inner.generation;
        }
        match result {
            Ok(experience) => {
                inner.experience = Some(experience);
                inner.generation = GenerationState::Ready;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch experience");
                inner.generation = GenerationState::Error;
            }
        }
        inner.generation
    }

    /// Toggles playback of the current experience.
    ///
    /// Does nothing until an experience is ready.
    pub async fn play(&self) -> Result<PlaybackState, PlaybackError> {
        let (text, language) = {
            let inner = self.inner.lock().await;
            match (inner.generation, &inner.experience) {
                (GenerationState::Ready, Some(experience)) => {
                    (experience.content.clone(), inner.language)
                }
                _ => {
                    debug!(generation = ?inner.generation, "No experience ready; ignoring play");
                    return Ok(self.playback.state());
                }
            }
        };
        self.playback.start(&text, language).await
    }

    /// Stops playback immediately, then clears the session after the
    /// transition delay, returning it to `Idle`.
    pub async fn close(&self) {
        let request_id = {
            let mut inner = self.inner.lock().await;
            inner.request_id += 1;
            inner.request_id
        };
        self.playback.stop().await;

        tokio::time::sleep(CLOSE_TRANSITION_DELAY).await;

        let mut inner = self.inner.lock().await;
        if inner.request_id != request_id {
            debug!("Session reopened during close transition");
            return;
        }
        inner.principle = None;
        inner.experience = None;
        inner.generation = GenerationState::Idle;
        info!("Session closed");
    }
}
