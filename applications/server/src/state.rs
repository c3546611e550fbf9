/// Shared application state
use crate::config::ServerConfig;
use soundboard_library::{LibraryManager, UrlIngestor};
use soundboard_playback::PlaybackDispatcher;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<LibraryManager>,
    pub ingestor: Arc<UrlIngestor>,
    pub dispatcher: Arc<PlaybackDispatcher>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        library: Arc<LibraryManager>,
        ingestor: Arc<UrlIngestor>,
        dispatcher: Arc<PlaybackDispatcher>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            library,
            ingestor,
            dispatcher,
            config,
        }
    }

    /// Run a blocking library operation off the async executor
    pub async fn blocking<T, F>(&self, op: F) -> crate::error::Result<T>
    where
        F: FnOnce(&LibraryManager) -> soundboard_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let library = Arc::clone(&self.library);
        let result = tokio::task::spawn_blocking(move || op(&library))
            .await
            .map_err(|e| crate::error::ServerError::Internal(format!("Worker failed: {}", e)))?;
        Ok(result?)
    }
}
