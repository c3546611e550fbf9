/// Sound catalog API routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SoundsQuery {
    /// One list ordered by display name instead of folder groups
    #[serde(default)]
    pub flat: bool,
}

/// GET /sounds
pub async fn list_sounds(
    State(app_state): State<AppState>,
    Query(query): Query<SoundsQuery>,
) -> Result<Response> {
    let catalog = app_state.blocking(|library| Ok(library.list())).await?;

    if query.flat {
        Ok(Json(catalog.flatten()).into_response())
    } else {
        Ok(Json(catalog).into_response())
    }
}

/// GET /folders
pub async fn list_folders(State(app_state): State<AppState>) -> Result<Json<Vec<String>>> {
    let folders = app_state.blocking(|library| Ok(library.folders())).await?;
    Ok(Json(folders))
}
