//! Native audio output built on `rodio`.
//!
//! `rodio::OutputStream` is not `Send`, so the binary opens it on the main
//! thread and keeps it alive for the whole run; only the `OutputStreamHandle`
//! travels into the backend.

use async_trait::async_trait;
use essentials_core::pcm::DecodedAudioBuffer;
use essentials_core::playback::output::{
    AudioBackend, AudioContext, AudioError, BackgroundTrack, ContextState, VoiceHandle,
    VoiceSource,
};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Opens the default output device.
pub fn open_output() -> Result<(OutputStream, OutputStreamHandle), AudioError> {
    OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))
}

struct RodioVoice {
    sink: Arc<Sink>,
    stopped: Arc<AtomicBool>,
}

impl VoiceSource for RodioVoice {
    fn stop(&self) -> Result<(), AudioError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(AudioError::Voice("voice already stopped".to_string()));
        }
        self.sink.stop();
        Ok(())
    }
}

/// Output context for voice buffers. Suspending pauses the current voice.
pub struct RodioContext {
    handle: OutputStreamHandle,
    state: Mutex<ContextState>,
    current: Mutex<Option<Arc<Sink>>>,
}

impl RodioContext {
    pub fn new(handle: OutputStreamHandle) -> Self {
        Self {
            handle,
            state: Mutex::new(ContextState::Suspended),
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AudioContext for RodioContext {
    fn state(&self) -> ContextState {
        *lock(&self.state)
    }

    async fn resume(&self) -> Result<(), AudioError> {
        let mut state = lock(&self.state);
        if *state == ContextState::Closed {
            return Err(AudioError::Device("audio context is closed".to_string()));
        }
        *state = ContextState::Running;
        if let Some(sink) = lock(&self.current).as_ref() {
            sink.play();
        }
        Ok(())
    }

    fn suspend(&self) -> Result<(), AudioError> {
        let mut state = lock(&self.state);
        if *state == ContextState::Closed {
            return Err(AudioError::Device("audio context is closed".to_string()));
        }
        *state = ContextState::Suspended;
        if let Some(sink) = lock(&self.current).as_ref() {
            sink.pause();
        }
        Ok(())
    }

    fn play(&self, buffer: DecodedAudioBuffer) -> Result<VoiceHandle, AudioError> {
        let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Voice(e.to_string()))?;
        if self.state() != ContextState::Running {
            sink.pause();
        }
        debug!(
            frames = buffer.frame_count(),
            sample_rate = buffer.sample_rate,
            "Queueing voice buffer"
        );
        sink.append(SamplesBuffer::new(
            buffer.channel_count,
            buffer.sample_rate,
            buffer.interleaved(),
        ));

        let sink = Arc::new(sink);
        let stopped = Arc::new(AtomicBool::new(false));
        let (ended_tx, ended) = oneshot::channel();

        // `sleep_until_end` blocks, so the end-of-voice signal comes from a thread.
        let watched = sink.clone();
        let watched_stopped = stopped.clone();
        std::thread::Builder::new()
            .name("voice-end".to_string())
            .spawn(move || {
                watched.sleep_until_end();
                if !watched_stopped.load(Ordering::SeqCst) {
                    let _ = ended_tx.send(());
                }
            })
            .map_err(|e| AudioError::Voice(e.to_string()))?;

        *lock(&self.current) = Some(sink.clone());
        Ok(VoiceHandle {
            source: Box::new(RodioVoice { sink, stopped }),
            ended,
        })
    }
}

/// Looping background music decoded from an in-memory file.
///
/// Rewinding rebuilds the sink from the cached bytes, keeping volume and
/// paused state.
pub struct RodioTrack {
    handle: OutputStreamHandle,
    bytes: Arc<[u8]>,
    sink: Mutex<Sink>,
}

impl RodioTrack {
    pub fn new(handle: OutputStreamHandle, bytes: Arc<[u8]>, volume: f32) -> Result<Self, AudioError> {
        let sink = build_looping_sink(&handle, &bytes, volume)?;
        Ok(Self {
            handle,
            bytes,
            sink: Mutex::new(sink),
        })
    }
}

fn build_looping_sink(
    handle: &OutputStreamHandle,
    bytes: &Arc<[u8]>,
    volume: f32,
) -> Result<Sink, AudioError> {
    let decoder =
        Decoder::new(Cursor::new(bytes.clone())).map_err(|e| AudioError::Background(e.to_string()))?;
    let sink = Sink::try_new(handle).map_err(|e| AudioError::Background(e.to_string()))?;
    sink.pause();
    sink.set_volume(volume);
    sink.append(decoder.repeat_infinite());
    Ok(sink)
}

impl BackgroundTrack for RodioTrack {
    fn play(&self) -> Result<(), AudioError> {
        lock(&self.sink).play();
        Ok(())
    }

    fn pause(&self) {
        lock(&self.sink).pause();
    }

    fn rewind(&self) {
        let mut sink = lock(&self.sink);
        let volume = sink.volume();
        let paused = sink.is_paused();
        match build_looping_sink(&self.handle, &self.bytes, volume) {
            Ok(fresh) => {
                if !paused {
                    fresh.play();
                }
                sink.stop();
                *sink = fresh;
            }
            Err(e) => warn!(error = %e, "Failed to rewind background track"),
        }
    }

    fn volume(&self) -> f32 {
        lock(&self.sink).volume()
    }

    fn set_volume(&self, volume: f32) {
        lock(&self.sink).set_volume(volume);
    }
}

/// `AudioBackend` over the default output device and a background track
/// fetched over HTTP.
pub struct RodioBackend {
    handle: Option<OutputStreamHandle>,
    http: reqwest::Client,
    background_url: String,
}

impl RodioBackend {
    /// `handle` is `None` when no output device could be opened; every
    /// playback attempt then fails with `AudioError::Device`.
    pub fn new(handle: Option<OutputStreamHandle>, background_url: String) -> Self {
        Self {
            handle,
            http: reqwest::Client::new(),
            background_url,
        }
    }

    fn handle(&self) -> Result<&OutputStreamHandle, AudioError> {
        self.handle
            .as_ref()
            .ok_or_else(|| AudioError::Device("no audio output device".to_string()))
    }

    #[instrument(skip(self), fields(url = %self.background_url))]
    async fn download_background(&self) -> Result<Arc<[u8]>, AudioError> {
        let response = self
            .http
            .get(&self.background_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AudioError::Background(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AudioError::Background(e.to_string()))?;
        info!(bytes = bytes.len(), "Background track downloaded");
        Ok(Arc::from(bytes.as_ref()))
    }
}

#[async_trait]
impl AudioBackend for RodioBackend {
    fn create_context(&self) -> Result<Arc<dyn AudioContext>, AudioError> {
        let handle = self.handle()?.clone();
        Ok(Arc::new(RodioContext::new(handle)))
    }

    async fn create_background(&self, volume: f32) -> Result<Arc<dyn BackgroundTrack>, AudioError> {
        let handle = self.handle()?.clone();
        let bytes = self.download_background().await?;
        Ok(Arc::new(RodioTrack::new(handle, bytes, volume)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_context_without_device_fails() {
        let backend = RodioBackend::new(None, "https://example.com/a.mp3".to_string());
        match backend.create_context() {
            Err(AudioError::Device(_)) => {}
            _ => panic!("Expected a device error"),
        }
    }

    #[tokio::test]
    async fn test_create_background_without_device_fails_before_download() {
        // Unroutable URL: reaching the network would surface a Background error instead.
        let backend = RodioBackend::new(None, "http://127.0.0.1:9/a.mp3".to_string());
        match backend.create_background(0.15).await {
            Err(AudioError::Device(_)) => {}
            _ => panic!("Expected a device error"),
        }
    }
}
