//! Audio output through rodio
//!
//! rodio's `OutputStream` cannot move between threads, so a dedicated thread
//! opens it and keeps it alive for as long as the engine exists. Only the
//! stream handle (which is `Send + Sync`) is shared with callers.

use crate::error::{PlaybackError, Result as PlaybackResult};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use soundboard_core::{BoardError, PlaybackHandle, Result, SoundEngine};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex, PoisonError};

/// Plays sounds on the default output device
pub struct RodioEngine {
    stream: OutputStreamHandle,
    sinks: Mutex<Vec<Arc<Sink>>>,
    // Dropping this ends the output thread and closes the device
    _keepalive: mpsc::Sender<()>,
}

impl RodioEngine {
    /// Open the default output device
    ///
    /// # Errors
    /// Returns an error if no output device is available
    pub fn open_default() -> PlaybackResult<Self> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (keepalive_tx, keepalive_rx) = mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("soundboard-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    // Returns once the engine's sender is dropped
                    let _ = keepalive_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio output closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| PlaybackError::Engine(format!("Failed to spawn output thread: {}", e)))?;

        let stream = ready_rx
            .recv()
            .map_err(|_| PlaybackError::Engine("Output thread exited early".to_string()))?
            .map_err(PlaybackError::Engine)?;

        tracing::info!("Opened default audio output");
        Ok(Self {
            stream,
            sinks: Mutex::new(Vec::new()),
            _keepalive: keepalive_tx,
        })
    }
}

impl SoundEngine for RodioEngine {
    fn play(&self, path: &Path) -> Result<Box<dyn PlaybackHandle>> {
        let file = File::open(path)
            .map_err(|e| BoardError::storage(format!("Failed to open {}", path.display()), e))?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| {
            BoardError::invalid_file_type(format!("{}: {}", path.display(), e))
        })?;
        let sink = Sink::try_new(&self.stream).map_err(|e| {
            BoardError::storage("Audio output unavailable", io::Error::other(e.to_string()))
        })?;
        sink.append(source);
        let sink = Arc::new(sink);

        let mut sinks = self.sinks.lock().unwrap_or_else(PoisonError::into_inner);
        for previous in sinks.drain(..) {
            previous.stop();
        }
        sinks.push(Arc::clone(&sink));

        Ok(Box::new(SinkHandle { sink }))
    }

    fn stop_all(&self) {
        let mut sinks = self.sinks.lock().unwrap_or_else(PoisonError::into_inner);
        for sink in sinks.drain(..) {
            sink.stop();
        }
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

/// Handle to one rodio sink
pub struct SinkHandle {
    sink: Arc<Sink>,
}

impl std::fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkHandle")
            .field("empty", &self.sink.empty())
            .finish()
    }
}

impl PlaybackHandle for SinkHandle {
    fn stop(&self) {
        self.sink.stop();
    }

    fn is_active(&self) -> bool {
        !self.sink.empty()
    }
}
