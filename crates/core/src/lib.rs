pub mod catalog;
pub mod experience;
pub mod generator;
pub mod language;
pub mod llm_client;
pub mod pcm;
pub mod playback;
pub mod session;
pub mod speech;

/// User-facing notifications raised by the pipeline.
///
/// Only playback failures reach the user; every other failure is logged and
/// absorbed where it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A playback attempt failed; `message` is the generic, localized text.
    PlaybackFailed { message: String },
}
