//! Soundboard Core
//!
//! Platform-agnostic types, traits, and error handling shared by the
//! soundboard library manager, the playback dispatcher and the HTTP server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Sound`, `Catalog`, `RemovalReport`
//! - **Core Traits**: `SoundEngine`, `PlaybackHandle`
//! - **Error Handling**: Unified `BoardError`, `ErrorKind` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use soundboard_core::types::{Catalog, Sound, MAIN_FOLDER};
//!
//! let mut catalog = Catalog::default();
//! catalog.insert(MAIN_FOLDER, Sound::from_relative_path("air-horn_long.mp3"));
//!
//! let sounds = catalog.folder(MAIN_FOLDER).unwrap();
//! assert_eq!(sounds[0].display_name, "air horn long");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{BoardError, ErrorKind, Result};
pub use traits::{PlaybackHandle, SoundEngine};
pub use types::{
    is_audio_extension, Catalog, FailedRemoval, RemovalReport, Sound, AUDIO_EXTENSIONS,
    MAIN_FOLDER,
};
