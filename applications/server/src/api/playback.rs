/// Playback API routes
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use soundboard_playback::StopOutcome;

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn new(status: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: status.into(),
        })
    }
}

/// POST /play
/// Queues the sound and answers without waiting for it to start
pub async fn play(
    State(app_state): State<AppState>,
    Json(req): Json<PlayRequest>,
) -> Result<Json<StatusResponse>> {
    let filename = req
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("No filename provided".to_string()))?;

    let ticket = app_state.dispatcher.play(&filename).await?;

    Ok(StatusResponse::new(format!("Playing {}", ticket.sound())))
}

/// POST /stop
pub async fn stop(State(app_state): State<AppState>) -> Json<StatusResponse> {
    match app_state.dispatcher.stop() {
        StopOutcome::Stopped => StatusResponse::new("Playback stopped"),
        StopOutcome::NothingPlaying => StatusResponse::new("No sound is playing"),
    }
}

/// POST /stopall
pub async fn stop_all(State(app_state): State<AppState>) -> Json<StatusResponse> {
    app_state.dispatcher.stop_all();
    StatusResponse::new("All playback stopped")
}
