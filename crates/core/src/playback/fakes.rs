//! In-memory audio output used by the playback and session tests.

use super::output::{
    AudioBackend, AudioContext, AudioError, BackgroundTrack, ContextState, VoiceHandle,
    VoiceSource,
};
use crate::pcm::DecodedAudioBuffer;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub struct FakeTrack {
    volume: Mutex<f32>,
    history: Mutex<Vec<f32>>,
    playing: AtomicBool,
    pauses: AtomicUsize,
    rewinds: AtomicUsize,
    refuse_play: AtomicBool,
}

impl FakeTrack {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: Mutex::new(volume),
            history: Mutex::new(Vec::new()),
            playing: AtomicBool::new(false),
            pauses: AtomicUsize::new(0),
            rewinds: AtomicUsize::new(0),
            refuse_play: AtomicBool::new(false),
        }
    }

    pub fn refuse_play(&self) {
        self.refuse_play.store(true, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn volume_history(&self) -> Vec<f32> {
        self.history.lock().unwrap().clone()
    }

    pub fn pause_count(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }

    pub fn rewind_count(&self) -> usize {
        self.rewinds.load(Ordering::SeqCst)
    }
}

impl BackgroundTrack for FakeTrack {
    fn play(&self) -> Result<(), AudioError> {
        if self.refuse_play.load(Ordering::SeqCst) {
            return Err(AudioError::Background("autoplay prevented".to_string()));
        }
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }

    fn rewind(&self) {
        self.rewinds.fetch_add(1, Ordering::SeqCst);
    }

    fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
        self.history.lock().unwrap().push(volume);
    }
}

struct FakeVoice {
    stopped: Arc<AtomicBool>,
}

impl VoiceSource for FakeVoice {
    fn stop(&self) -> Result<(), AudioError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(AudioError::Voice("already stopped".to_string()));
        }
        Ok(())
    }
}

pub struct FakeContext {
    state: Mutex<ContextState>,
    played: Mutex<Vec<DecodedAudioBuffer>>,
    ended_tx: Mutex<Option<oneshot::Sender<()>>>,
    voice_stopped: Mutex<Option<Arc<AtomicBool>>>,
    suspends: AtomicUsize,
}

impl FakeContext {
    fn new() -> Self {
        Self {
            state: Mutex::new(ContextState::Suspended),
            played: Mutex::new(Vec::new()),
            ended_tx: Mutex::new(None),
            voice_stopped: Mutex::new(None),
            suspends: AtomicUsize::new(0),
        }
    }

    pub fn played(&self) -> Vec<DecodedAudioBuffer> {
        self.played.lock().unwrap().clone()
    }

    pub fn suspend_count(&self) -> usize {
        self.suspends.load(Ordering::SeqCst)
    }

    pub fn voice_stopped(&self) -> bool {
        self.voice_stopped
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|s| s.load(Ordering::SeqCst))
    }

    /// Simulates the voice buffer playing to its end.
    pub fn finish_voice(&self) {
        if let Some(tx) = self.ended_tx.lock().unwrap().take() {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
impl AudioContext for FakeContext {
    fn state(&self) -> ContextState {
        *self.state.lock().unwrap()
    }

    async fn resume(&self) -> Result<(), AudioError> {
        *self.state.lock().unwrap() = ContextState::Running;
        Ok(())
    }

    fn suspend(&self) -> Result<(), AudioError> {
        *self.state.lock().unwrap() = ContextState::Suspended;
        self.suspends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self, buffer: DecodedAudioBuffer) -> Result<VoiceHandle, AudioError> {
        let (tx, rx) = oneshot::channel();
        let stopped = Arc::new(AtomicBool::new(false));
        self.played.lock().unwrap().push(buffer);
        *self.ended_tx.lock().unwrap() = Some(tx);
        *self.voice_stopped.lock().unwrap() = Some(stopped.clone());
        Ok(VoiceHandle {
            source: Box::new(FakeVoice { stopped }),
            ended: rx,
        })
    }
}

/// Hands out a single shared context and track, counting how often each is created.
pub struct FakeBackend {
    pub context: Arc<FakeContext>,
    pub track: Arc<FakeTrack>,
    contexts_created: AtomicUsize,
    tracks_created: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            context: Arc::new(FakeContext::new()),
            track: Arc::new(FakeTrack::new(0.0)),
            contexts_created: AtomicUsize::new(0),
            tracks_created: AtomicUsize::new(0),
        }
    }

    pub fn contexts_created(&self) -> usize {
        self.contexts_created.load(Ordering::SeqCst)
    }

    pub fn tracks_created(&self) -> usize {
        self.tracks_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioBackend for FakeBackend {
    fn create_context(&self) -> Result<Arc<dyn AudioContext>, AudioError> {
        self.contexts_created.fetch_add(1, Ordering::SeqCst);
        Ok(self.context.clone())
    }

    async fn create_background(
        &self,
        volume: f32,
    ) -> Result<Arc<dyn BackgroundTrack>, AudioError> {
        self.tracks_created.fetch_add(1, Ordering::SeqCst);
        *self.track.volume.lock().unwrap() = volume;
        Ok(self.track.clone())
    }
}
