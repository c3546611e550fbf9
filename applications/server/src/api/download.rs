/// Remote download API route
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
}

/// POST /download-url
pub async fn download_url(
    State(app_state): State<AppState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<serde_json::Value>> {
    let url = req
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("No URL provided".to_string()))?;
    let folder = req.folder.filter(|f| !f.trim().is_empty());

    let stored = app_state.ingestor.ingest(&url, folder.as_deref()).await?;

    Ok(Json(json!({
        "status": "File downloaded successfully",
        "filename": stored.filename,
        "path": stored.relative_path,
    })))
}
