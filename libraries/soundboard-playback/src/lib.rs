//! Soundboard Playback
//!
//! Serializes play requests onto a [`SoundEngine`](soundboard_core::SoundEngine)
//! and tracks the single current sound.
//!
//! # Architecture
//!
//! - `dispatcher`: queue, worker task and the current-sound slot
//! - `engine`: [`NullEngine`] for hosts without audio output
//! - `rodio_engine`: device output (feature `device-output`)

pub mod dispatcher;
pub mod engine;
pub mod error;
#[cfg(feature = "device-output")]
pub mod rodio_engine;

pub use dispatcher::{PlayOutcome, PlayTicket, PlaybackConfig, PlaybackDispatcher, StopOutcome};
pub use engine::{FlagHandle, NullEngine};
pub use error::{PlaybackError, Result};
#[cfg(feature = "device-output")]
pub use rodio_engine::RodioEngine;
