//! Audio output abstractions.
//!
//! The controller only talks to these traits, so a native device backend and
//! the in-memory fakes used by tests are interchangeable.

use crate::pcm::DecodedAudioBuffer;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Audio output unavailable: {0}")]
    Device(String),
    #[error("Background track unavailable: {0}")]
    Background(String),
    #[error("Voice playback failed: {0}")]
    Voice(String),
}

/// A voice buffer that is currently playing.
pub trait VoiceSource: Send + Sync {
    /// Halts output. Stopping an already finished source may return an error,
    /// which callers ignore.
    fn stop(&self) -> Result<(), AudioError>;
}

/// What `AudioContext::play` hands back: the live source plus a signal that
/// fires once when the buffer plays to its natural end.
pub struct VoiceHandle {
    pub source: Box<dyn VoiceSource>,
    pub ended: oneshot::Receiver<()>,
}

/// The shared audio output, created lazily once and then resumed/suspended.
#[async_trait]
pub trait AudioContext: Send + Sync {
    fn state(&self) -> ContextState;
    async fn resume(&self) -> Result<(), AudioError>;
    fn suspend(&self) -> Result<(), AudioError>;
    /// Starts playing `buffer` immediately.
    fn play(&self, buffer: DecodedAudioBuffer) -> Result<VoiceHandle, AudioError>;
}

/// A looping background music player, modelled on a media element.
pub trait BackgroundTrack: Send + Sync {
    /// Starts or continues looping playback. An error means the player refused
    /// to start (for example an autoplay restriction).
    fn play(&self) -> Result<(), AudioError>;
    fn pause(&self);
    /// Moves the play position back to the start.
    fn rewind(&self);
    fn volume(&self) -> f32;
    fn set_volume(&self, volume: f32);
}

/// Factory for the output resources.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    fn create_context(&self) -> Result<Arc<dyn AudioContext>, AudioError>;
    /// Loads the background track, ready to loop at `volume`.
    async fn create_background(&self, volume: f32) -> Result<Arc<dyn BackgroundTrack>, AudioError>;
}
