//! Soundboard Server Library
//!
//! HTTP front end for a directory of sounds: browsing, uploads, remote
//! downloads, folder management and playback on the host's audio output.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;
