//! Error types for playback dispatch

use soundboard_core::BoardError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The requested path was rejected or (when reported) missing
    #[error(transparent)]
    Library(#[from] BoardError),

    /// The dispatcher worker is gone; no more requests can be served
    #[error("Playback dispatcher is not running")]
    DispatcherStopped,

    /// The engine could not start the sound
    #[error("Audio engine error: {0}")]
    Engine(String),
}

impl PlaybackError {
    /// The underlying library error, if any
    pub fn as_board_error(&self) -> Option<&BoardError> {
        match self {
            Self::Library(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
