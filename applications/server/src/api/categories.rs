/// Folder ("category") management and sound moves
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use soundboard_core::RemovalReport;

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(default)]
    pub source_path: Option<String>,
    #[serde(default)]
    pub target_folder: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveCategoriesRequest {
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Batch removal outcome as the web UI renders it
#[derive(Debug, Serialize)]
pub struct RemoveCategoriesResponse {
    pub removed: Vec<String>,
    /// `"name (reason)"` per folder left in place
    pub failed: Vec<String>,
}

impl From<RemovalReport> for RemoveCategoriesResponse {
    fn from(report: RemovalReport) -> Self {
        Self {
            removed: report.removed,
            failed: report
                .failed
                .into_iter()
                .map(|f| format!("{} ({})", f.name, f.reason))
                .collect(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /move
pub async fn move_sound(
    State(app_state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<serde_json::Value>> {
    let (Some(source), Some(target)) = (non_empty(req.source_path), non_empty(req.target_folder))
    else {
        return Err(ServerError::BadRequest(
            "Missing source_path or target_folder".to_string(),
        ));
    };

    let new_path = app_state
        .blocking(move |library| library.move_sound(&source, &target))
        .await?;

    Ok(Json(json!({
        "status": "File moved successfully",
        "new_path": new_path,
    })))
}

/// POST /create-category
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<serde_json::Value>> {
    let name = non_empty(req.category_name)
        .ok_or_else(|| ServerError::BadRequest("Category name is required".to_string()))?;

    let created = app_state
        .blocking(move |library| library.create_folder(&name))
        .await?;

    Ok(Json(json!({
        "status": format!("Category '{}' created successfully", created),
        "category": created,
    })))
}

/// GET /empty-categories
pub async fn empty_categories(State(app_state): State<AppState>) -> Result<Json<Vec<String>>> {
    let folders = app_state
        .blocking(|library| library.list_empty_folders())
        .await?;
    Ok(Json(folders))
}

/// POST /remove-categories
///
/// Answers 207 Multi-Status when any folder could not be removed.
pub async fn remove_categories(
    State(app_state): State<AppState>,
    Json(req): Json<RemoveCategoriesRequest>,
) -> Result<Response> {
    if req.categories.is_empty() {
        return Err(ServerError::BadRequest("No categories provided".to_string()));
    }

    let report = app_state
        .blocking(move |library| Ok(library.remove_folders(&req.categories)))
        .await?;

    let status = if report.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };

    Ok((status, Json(RemoveCategoriesResponse::from(report))).into_response())
}
