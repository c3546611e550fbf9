/// Upload API route
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;
use soundboard_library::PendingUpload;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub filename: String,
    pub path: String,
}

/// POST /upload
/// Multipart form with a `file` part and an optional `folder` field
///
/// The file part is streamed into a staging file as it arrives, so the
/// `folder` field may come before or after it.
pub async fn upload_sound(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<UploadResponse>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServerError::BadRequest("Missing Content-Type".to_string()))?;

    if !content_type.starts_with("multipart/form-data") {
        return Err(ServerError::BadRequest(
            "Expected multipart/form-data".to_string(),
        ));
    }

    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ServerError::BadRequest("Missing boundary".to_string()))?;

    let max_bytes = app_state.config.server.max_upload_bytes;
    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().whole_stream(max_bytes));
    let multipart =
        multer::Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut form = UploadForm::default();
    if let Err(e) = receive(multipart, &app_state, &mut form).await {
        if let Some(pending) = form.pending.take() {
            abandon(&app_state, pending).await;
        }
        return Err(e);
    }

    let Some(pending) = form.pending else {
        let message = if form.unnamed_file {
            "No file selected"
        } else {
            "No file part"
        };
        return Err(ServerError::BadRequest(message.to_string()));
    };

    let folder = form.folder;
    let stored = app_state
        .blocking(move |library| library.commit_upload(pending, folder.as_deref()))
        .await?;

    Ok(Json(UploadResponse {
        status: "File uploaded successfully".to_string(),
        filename: stored.filename,
        path: stored.relative_path,
    }))
}

#[derive(Default)]
struct UploadForm {
    pending: Option<PendingUpload>,
    folder: Option<String>,
    unnamed_file: bool,
}

async fn receive(
    mut multipart: multer::Multipart<'static>,
    app_state: &AppState,
    form: &mut UploadForm,
) -> Result<()> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" if form.pending.is_none() => {
                let filename = field.file_name().unwrap_or("").to_string();
                if filename.is_empty() {
                    form.unnamed_file = true;
                    continue;
                }

                let (pending, file) = app_state
                    .blocking(move |library| library.begin_upload(&filename))
                    .await?;
                form.pending = Some(pending);

                let written = write_field(&mut field, file).await?;
                tracing::debug!(bytes = written, "Received upload");
            }
            "folder" => {
                let value = field.text().await.map_err(multipart_error)?;
                form.folder = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    Ok(())
}

async fn write_field(field: &mut multer::Field<'static>, file: std::fs::File) -> Result<u64> {
    let mut file = tokio::fs::File::from_std(file);
    let mut written: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

async fn abandon(app_state: &AppState, pending: PendingUpload) {
    let library = Arc::clone(&app_state.library);
    if let Err(e) = tokio::task::spawn_blocking(move || library.abandon_upload(pending)).await {
        tracing::warn!("Failed to discard staged upload: {}", e);
    }
}

fn multipart_error(err: multer::Error) -> ServerError {
    match err {
        multer::Error::StreamSizeExceeded { limit } => {
            ServerError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", limit))
        }
        other => ServerError::BadRequest(format!("Failed to parse multipart: {}", other)),
    }
}
