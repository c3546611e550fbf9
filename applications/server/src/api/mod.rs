/// API route modules
pub mod audio;
pub mod categories;
pub mod download;
pub mod health;
pub mod playback;
pub mod sounds;
pub mod upload;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router
///
/// When `web_dir` exists, paths no route matches are served from it, with
/// `index.html` as the fallback document.
pub fn router(app_state: AppState, web_dir: Option<&Path>) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        // Catalog
        .route("/sounds", get(sounds::list_sounds))
        .route("/folders", get(sounds::list_folders))
        .route("/audio/*path", get(audio::serve_audio))
        // Library mutations
        .route("/upload", post(upload::upload_sound))
        .route("/download-url", post(download::download_url))
        .route("/move", post(categories::move_sound))
        .route("/create-category", post(categories::create_category))
        .route("/empty-categories", get(categories::empty_categories))
        .route("/remove-categories", post(categories::remove_categories))
        // Playback
        .route("/play", post(playback::play))
        .route("/stop", post(playback::stop))
        .route("/stopall", post(playback::stop_all));

    let routes = match web_dir.filter(|dir| dir.is_dir()) {
        Some(dir) => {
            tracing::info!("Serving web UI from {}", dir.display());
            let index = ServeFile::new(dir.join("index.html"));
            routes.fallback_service(ServeDir::new(dir).not_found_service(index))
        }
        None => routes,
    };

    routes
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
