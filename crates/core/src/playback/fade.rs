use super::output::BackgroundTrack;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Background music volume while an experience plays.
pub const BACKGROUND_VOLUME: f32 = 0.15;
pub const FADE_STEP: f32 = 0.02;
/// Once the volume is at or below this level the track is paused.
pub const FADE_FLOOR: f32 = 0.02;
pub const FADE_TICK: Duration = Duration::from_millis(200);

/// Spawns the background fade-out. Aborting the returned handle cancels it.
///
/// Every tick lowers the volume by `FADE_STEP`; when it reaches `FADE_FLOOR`
/// the track is paused and its volume reset to `BACKGROUND_VOLUME`.
pub fn spawn_fade_out(track: Arc<dyn BackgroundTrack>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(FADE_TICK);
        // The first tick of an interval completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let volume = track.volume();
            if volume > FADE_FLOOR {
                track.set_volume((volume - FADE_STEP).max(0.0));
            } else {
                track.pause();
                track.set_volume(BACKGROUND_VOLUME);
                debug!("Background fade-out complete");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::fakes::FakeTrack;

    #[tokio::test(start_paused = true)]
    async fn test_fade_steps_on_each_tick() {
        let track = Arc::new(FakeTrack::new(BACKGROUND_VOLUME));
        track.play().unwrap();
        let handle = spawn_fade_out(track.clone());

        tokio::time::sleep(FADE_TICK / 2).await;
        assert_eq!(track.volume_history().len(), 0);

        tokio::time::sleep(FADE_TICK).await;
        assert_eq!(track.volume_history().len(), 1);
        assert!((track.volume() - 0.13).abs() < 1e-6);
        assert!(track.is_playing());

        handle.await.unwrap();
        assert!(!track.is_playing());
        assert_eq!(track.volume(), BACKGROUND_VOLUME);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_is_monotonic_then_resets() {
        let track = Arc::new(FakeTrack::new(BACKGROUND_VOLUME));
        track.play().unwrap();
        spawn_fade_out(track.clone()).await.unwrap();

        let history = track.volume_history();
        let (reset, fade) = history.split_last().unwrap();
        assert_eq!(*reset, BACKGROUND_VOLUME);
        assert!(fade.windows(2).all(|w| w[1] < w[0]));
        assert!(fade[0] < BACKGROUND_VOLUME);
        assert!(*fade.last().unwrap() <= FADE_FLOOR);
        assert_eq!(track.pause_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_cancels_fade() {
        let track = Arc::new(FakeTrack::new(BACKGROUND_VOLUME));
        let handle = spawn_fade_out(track.clone());
        tokio::time::sleep(FADE_TICK * 2 + FADE_TICK / 2).await;
        handle.abort();
        tokio::time::sleep(FADE_TICK * 10).await;

        assert_eq!(track.volume_history().len(), 2);
        assert_eq!(track.pause_count(), 0);
    }
}
