/// Core traits for the soundboard
use crate::error::Result;
use std::path::Path;

/// Sound engine capability
///
/// Implementers load an audio file and start it on the output device. The
/// engine owns silencing: starting a new sound may stop whatever it was
/// playing before, the dispatcher never does that on its behalf.
///
/// `play` may block while the file is opened and decoded; callers run it off
/// the async executor.
pub trait SoundEngine: Send + Sync {
    /// Load `path` and begin playback, returning a handle to the new sound
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or decoded, or the
    /// output device is unavailable
    fn play(&self, path: &Path) -> Result<Box<dyn PlaybackHandle>>;

    /// Silence everything the engine is playing
    fn stop_all(&self);

    /// Short name for logs
    fn name(&self) -> &'static str {
        "engine"
    }
}

/// Handle to one sound started by a [`SoundEngine`]
///
/// Dropping a handle must not stop the sound.
pub trait PlaybackHandle: Send + Sync + std::fmt::Debug {
    /// Stop this sound
    fn stop(&self);

    /// Whether the sound is still audible
    fn is_active(&self) -> bool;
}
