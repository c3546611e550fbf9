//! Playback dispatcher
//!
//! Play requests are queued and served one at a time by a single worker
//! task, in arrival order, so the last request processed wins the slot. The
//! slot holds at most one handle and is only ever replaced by a single
//! assignment under its lock.

use crate::error::{PlaybackError, Result};
use soundboard_core::{BoardError, PlaybackHandle, SoundEngine};
use soundboard_library::{PathError, PathResolver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};

/// Dispatcher settings
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Reject play requests for missing files instead of ignoring them
    pub report_missing: bool,
    /// Play requests that may wait for the worker before callers block
    pub queue_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            report_missing: false,
            queue_capacity: 16,
        }
    }
}

/// What happened to a queued play request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The engine started the sound and it now occupies the slot
    Started,
    /// The file was gone by the time the worker got to it
    Missing,
    /// The engine refused the file
    Failed(String),
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A sound was in the slot and has been stopped
    Stopped,
    /// The slot was empty
    NothingPlaying,
}

/// Receipt for a queued play request
///
/// Dropping the ticket does not cancel the request.
#[derive(Debug)]
pub struct PlayTicket {
    sound: String,
    done: oneshot::Receiver<PlayOutcome>,
}

impl PlayTicket {
    /// The root-relative path that was requested
    pub fn sound(&self) -> &str {
        &self.sound
    }

    /// Wait until the worker has served the request
    pub async fn outcome(self) -> Result<PlayOutcome> {
        self.done.await.map_err(|_| PlaybackError::DispatcherStopped)
    }
}

#[derive(Debug)]
struct Current {
    sound: String,
    handle: Box<dyn PlaybackHandle>,
}

type Slot = Arc<Mutex<Option<Current>>>;

struct PlayRequest {
    sound: String,
    done: oneshot::Sender<PlayOutcome>,
}

/// Single-slot playback front end over a [`SoundEngine`]
pub struct PlaybackDispatcher {
    resolver: PathResolver,
    engine: Arc<dyn SoundEngine>,
    slot: Slot,
    requests: mpsc::Sender<PlayRequest>,
    config: PlaybackConfig,
}

impl PlaybackDispatcher {
    /// Create the dispatcher and spawn its worker on the current runtime
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn start(
        resolver: PathResolver,
        engine: Arc<dyn SoundEngine>,
        config: PlaybackConfig,
    ) -> Self {
        let (requests, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let slot: Slot = Arc::new(Mutex::new(None));

        let worker = Worker {
            resolver: resolver.clone(),
            engine: Arc::clone(&engine),
            slot: Arc::clone(&slot),
        };
        tokio::spawn(async move {
            tracing::info!("Playback worker started (engine: {})", worker.engine.name());
            worker.run(receiver).await;
        });

        Self {
            resolver,
            engine,
            slot,
            requests,
            config,
        }
    }

    /// Queue `sound` (root-relative) for playback
    ///
    /// Returns once the request is queued, not when the sound starts.
    /// Paths escaping the root are always rejected; a missing file is only
    /// rejected here when `report_missing` is set, otherwise the worker
    /// logs and skips it.
    pub async fn play(&self, sound: &str) -> Result<PlayTicket> {
        let sound = sound.trim();
        if sound.is_empty() {
            return Err(BoardError::invalid_input("No filename provided").into());
        }

        let checked = if self.config.report_missing {
            self.resolver.resolve_existing(sound)
        } else {
            self.resolver.resolve(sound)
        };
        checked.map_err(BoardError::from)?;

        let (done, receiver) = oneshot::channel();
        self.requests
            .send(PlayRequest {
                sound: sound.to_string(),
                done,
            })
            .await
            .map_err(|_| PlaybackError::DispatcherStopped)?;

        tracing::debug!(sound = %sound, "Queued play request");
        Ok(PlayTicket {
            sound: sound.to_string(),
            done: receiver,
        })
    }

    /// Stop the sound in the slot, if any, and clear the slot
    pub fn stop(&self) -> StopOutcome {
        let current = lock(&self.slot).take();
        match current {
            Some(current) => {
                current.handle.stop();
                tracing::info!(sound = %current.sound, "Playback stopped");
                StopOutcome::Stopped
            }
            None => StopOutcome::NothingPlaying,
        }
    }

    /// Silence everything the engine is playing and clear the slot
    pub fn stop_all(&self) {
        self.engine.stop_all();
        lock(&self.slot).take();
        tracing::info!("All playback stopped");
    }

    /// The sound in the slot, if it is still audible
    pub fn now_playing(&self) -> Option<String> {
        lock(&self.slot)
            .as_ref()
            .filter(|current| current.handle.is_active())
            .map(|current| current.sound.clone())
    }

    /// Play requests waiting for the worker
    pub fn pending(&self) -> usize {
        self.requests.max_capacity() - self.requests.capacity()
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }
}

fn lock(slot: &Mutex<Option<Current>>) -> MutexGuard<'_, Option<Current>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Worker {
    resolver: PathResolver,
    engine: Arc<dyn SoundEngine>,
    slot: Slot,
}

impl Worker {
    async fn run(self, mut requests: mpsc::Receiver<PlayRequest>) {
        while let Some(request) = requests.recv().await {
            let outcome = self.serve(&request.sound).await;
            // The requester may have dropped its ticket
            let _ = request.done.send(outcome);
        }
        tracing::info!("Playback worker stopped");
    }

    async fn serve(&self, sound: &str) -> PlayOutcome {
        let path = match self.resolver.resolve_existing(sound) {
            Ok(path) if path.is_file() => path,
            Ok(_) | Err(PathError::NotFound(_)) => {
                tracing::warn!(sound = %sound, "File not found, nothing played");
                return PlayOutcome::Missing;
            }
            Err(e) => {
                tracing::warn!(sound = %sound, "Refusing to play: {}", e);
                return PlayOutcome::Failed(e.to_string());
            }
        };

        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || engine.play(&path)).await {
            Ok(Ok(handle)) => {
                *lock(&self.slot) = Some(Current {
                    sound: sound.to_string(),
                    handle,
                });
                tracing::info!(sound = %sound, "Playing");
                PlayOutcome::Started
            }
            Ok(Err(e)) => {
                tracing::error!(sound = %sound, "Engine failed to play: {}", e);
                PlayOutcome::Failed(e.to_string())
            }
            Err(e) => {
                tracing::error!(sound = %sound, "Playback task failed: {}", e);
                PlayOutcome::Failed(e.to_string())
            }
        }
    }
}
