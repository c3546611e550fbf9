//! Sound engine used when no audio device is configured
//!
//! [`NullEngine`] accepts every file and reports it as playing until stopped.
//! It keeps the server usable on headless hosts and serves as the reference
//! engine in tests.

use soundboard_core::{PlaybackHandle, Result, SoundEngine};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Engine without audio output
#[derive(Debug, Default)]
pub struct NullEngine {
    active: Mutex<Vec<Arc<AtomicBool>>>,
}

impl NullEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SoundEngine for NullEngine {
    fn play(&self, path: &Path) -> Result<Box<dyn PlaybackHandle>> {
        tracing::info!("No audio output, skipping {}", path.display());

        let flag = Arc::new(AtomicBool::new(true));
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        // A new sound silences the previous ones, like a real output would
        for previous in active.drain(..) {
            previous.store(false, Ordering::SeqCst);
        }
        active.push(Arc::clone(&flag));

        Ok(Box::new(FlagHandle { active: flag }))
    }

    fn stop_all(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        for flag in active.drain(..) {
            flag.store(false, Ordering::SeqCst);
        }
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Handle whose only state is an "audible" flag
#[derive(Debug)]
pub struct FlagHandle {
    active: Arc<AtomicBool>,
}

impl PlaybackHandle for FlagHandle {
    fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
