//! Voice and background music playback.
//!
//! `PlaybackController` owns every audio resource for a session: the output
//! context, the active voice source and the looping background track. The
//! context and track are created lazily on first use and reused afterwards.
//! All teardown funnels through `stop()`, which is idempotent.

pub mod fade;
pub mod output;

#[cfg(test)]
pub(crate) mod fakes;

use crate::Notice;
use crate::language::Language;
use crate::pcm::{self, TTS_CHANNELS, TTS_SAMPLE_RATE};
use crate::speech::SpeechSynthesizer;
use fade::BACKGROUND_VOLUME;
use output::{AudioBackend, AudioContext, AudioError, BackgroundTrack, ContextState, VoiceHandle, VoiceSource};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    Stopped,
    AudioLoading,
    Playing,
}

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Speech synthesis returned no audio")]
    NoAudio,
    #[error(transparent)]
    Audio(#[from] AudioError),
}

#[derive(Default)]
struct PlaybackInner {
    context: Option<Arc<dyn AudioContext>>,
    background: Option<Arc<dyn BackgroundTrack>>,
    voice: Option<Box<dyn VoiceSource>>,
    completion: Option<JoinHandle<()>>,
    fade: Option<JoinHandle<()>>,
    /// A fade whose `JoinHandle` was handed to `finish_fade`.
    awaited_fade: Option<AbortHandle>,
    /// Bumped by every start and stop; work belonging to an older epoch is discarded.
    epoch: u64,
}

impl PlaybackInner {
    /// Aborts any background fade-out, returning whether one was registered.
    fn abort_fade(&mut self) -> bool {
        let mut fading = false;
        if let Some(fade) = self.fade.take() {
            fade.abort();
            fading = true;
        }
        if let Some(fade) = self.awaited_fade.take() {
            fade.abort();
            fading = true;
        }
        fading
    }
}

struct Shared {
    inner: Mutex<PlaybackInner>,
    state: watch::Sender<PlaybackState>,
}

impl Shared {
    fn set_state(&self, state: PlaybackState) {
        self.state.send_replace(state);
    }

    fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Releases everything the current attempt holds. Must be called with the lock held.
    fn stop_locked(&self, inner: &mut PlaybackInner) {
        inner.epoch += 1;
        if let Some(completion) = inner.completion.take() {
            completion.abort();
        }
        let fading = inner.abort_fade();
        if let Some(voice) = inner.voice.take() {
            if let Err(e) = voice.stop() {
                debug!(error = %e, "Ignoring error while stopping voice source");
            }
        }
        if let Some(track) = &inner.background {
            track.pause();
            track.rewind();
            if fading {
                track.set_volume(BACKGROUND_VOLUME);
            }
        }
        if let Some(context) = &inner.context {
            if context.state() == ContextState::Running {
                if let Err(e) = context.suspend() {
                    warn!(error = %e, "Failed to suspend audio context");
                }
            }
        }
        self.set_state(PlaybackState::Stopped);
    }
}

pub struct PlaybackController {
    backend: Arc<dyn AudioBackend>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    shared: Arc<Shared>,
    notices: Option<mpsc::Sender<Notice>>,
}

impl PlaybackController {
    /// Creates a controller. `notices`, if given, receives the user-facing
    /// notification when a playback attempt fails.
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        notices: Option<mpsc::Sender<Notice>>,
    ) -> Self {
        let (state, _) = watch::channel(PlaybackState::Stopped);
        Self {
            backend,
            synthesizer,
            shared: Arc::new(Shared {
                inner: Mutex::new(PlaybackInner::default()),
                state,
            }),
            notices,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.shared.state.subscribe()
    }

    /// Plays `text` as speech over the background track, or stops playback if
    /// it is already playing.
    ///
    /// On failure everything is torn down, a single `Notice::PlaybackFailed`
    /// is sent and the error is returned for logging.
    pub async fn start(&self, text: &str, language: Language) -> Result<PlaybackState, PlaybackError> {
        let epoch = {
            let mut inner = self.shared.inner.lock().await;
            match self.shared.state() {
                PlaybackState::Playing => {
                    info!("Playback toggled off");
                    self.shared.stop_locked(&mut inner);
                    return Ok(PlaybackState::Stopped);
                }
                PlaybackState::AudioLoading => {
                    debug!("Audio is already loading; ignoring start");
                    return Ok(PlaybackState::AudioLoading);
                }
                PlaybackState::Stopped => {
                    // A fade left over from the previous voice must not touch the new playback.
                    let owned = inner.fade.take();
                    let fading = inner.abort_fade() | owned.is_some();
                    if let Some(fade) = owned {
                        fade.abort();
                        let _ = fade.await;
                    }
                    if fading {
                        if let Some(track) = &inner.background {
                            track.set_volume(BACKGROUND_VOLUME);
                        }
                        debug!("Background fade-out cancelled by restart");
                    }
                }
            }
            inner.epoch += 1;
            self.shared.set_state(PlaybackState::AudioLoading);
            inner.epoch
        };

        match self.try_start(text, language, epoch).await {
            Ok(state) => Ok(state),
            Err(e) => {
                let mut inner = self.shared.inner.lock().await;
                if inner.epoch != epoch {
                    debug!(error = %e, "Superseded playback attempt failed");
                    return Err(e);
                }
                error!(error = %e, "Audio playback error");
                self.shared.stop_locked(&mut inner);
                drop(inner);
                self.notify(Notice::PlaybackFailed {
                    message: language.config().ui.playback_error.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn try_start(
        &self,
        text: &str,
        language: Language,
        epoch: u64,
    ) -> Result<PlaybackState, PlaybackError> {
        let context = self.context().await?;
        if context.state() == ContextState::Suspended {
            context.resume().await?;
        }

        let bytes = self
            .synthesizer
            .synthesize(text.to_string(), language)
            .await
            .ok_or(PlaybackError::NoAudio)?;
        let buffer = pcm::decode(&bytes, TTS_SAMPLE_RATE, TTS_CHANNELS);
        info!(frames = buffer.frame_count(), duration = ?buffer.duration(), "Speech audio decoded");

        let background = self.background().await;

        let mut inner = self.shared.inner.lock().await;
        if inner.epoch != epoch {
            info!("Playback was stopped while audio was loading; discarding audio");
            return Ok(self.shared.state());
        }

        if let Some(track) = &background {
            if let Err(e) = track.play() {
                warn!(error = %e, "Background music autoplay prevented");
            }
        }

        let VoiceHandle { source, ended } = context.play(buffer)?;
        inner.voice = Some(source);
        inner.completion = Some(self.spawn_completion(ended, epoch));
        self.shared.set_state(PlaybackState::Playing);
        info!(%language, "Playback started");
        Ok(PlaybackState::Playing)
    }

    /// Halts all output and clears the playing and loading flags. Safe to call
    /// at any time, including when nothing is playing.
    pub async fn stop(&self) {
        let mut inner = self.shared.inner.lock().await;
        self.shared.stop_locked(&mut inner);
    }

    /// Waits for a running background fade-out, if any, to finish.
    ///
    /// `stop` and `start` can still cancel the fade while this waits; it then
    /// returns early.
    pub async fn finish_fade(&self) {
        let fade = {
            let mut inner = self.shared.inner.lock().await;
            let fade = inner.fade.take();
            if let Some(fade) = &fade {
                inner.awaited_fade = Some(fade.abort_handle());
            }
            fade
        };
        if let Some(fade) = fade {
            let _ = fade.await;
        }
    }

    /// Stops playback and drops the lazily created context and track so the
    /// next `start` creates fresh ones.
    pub async fn reset(&self) {
        let mut inner = self.shared.inner.lock().await;
        self.shared.stop_locked(&mut inner);
        inner.context = None;
        inner.background = None;
    }

    async fn context(&self) -> Result<Arc<dyn AudioContext>, AudioError> {
        let mut inner = self.shared.inner.lock().await;
        if let Some(context) = &inner.context {
            return Ok(context.clone());
        }
        let context = self.backend.create_context()?;
        inner.context = Some(context.clone());
        Ok(context)
    }

    /// Returns the background track, loading it on first use. A track that
    /// fails to load is logged and playback continues with voice only.
    async fn background(&self) -> Option<Arc<dyn BackgroundTrack>> {
        if let Some(track) = &self.shared.inner.lock().await.background {
            return Some(track.clone());
        }
        let track = match self.backend.create_background(BACKGROUND_VOLUME).await {
            Ok(track) => track,
            Err(e) => {
                warn!(error = %e, "Background music unavailable");
                return None;
            }
        };
        let mut inner = self.shared.inner.lock().await;
        Some(inner.background.get_or_insert(track).clone())
    }

    fn spawn_completion(&self, ended: oneshot::Receiver<()>, epoch: u64) -> JoinHandle<()> {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            if ended.await.is_err() {
                return;
            }
            let mut inner = shared.inner.lock().await;
            if inner.epoch != epoch {
                return;
            }
            info!("Voice playback finished");
            inner.voice = None;
            inner.completion = None;
            shared.set_state(PlaybackState::Stopped);
            if let Some(track) = inner.background.clone() {
                inner.fade = Some(fade::spawn_fade_out(track));
            }
        })
    }

    async fn notify(&self, notice: Notice) {
        if let Some(tx) = &self.notices {
            if tx.send(notice).await.is_err() {
                warn!("Failed to send notice: receiver dropped.");
            }
        }
    }
}
