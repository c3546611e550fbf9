/// Raw audio file serving
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use soundboard_core::BoardError;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_util::io::ReaderStream;

/// GET /audio/*path
/// Stream a sound with range request support
pub async fn serve_audio(
    Path(path): Path<String>,
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    // Same containment rules as every other path input
    let file_path = app_state
        .library
        .resolver()
        .resolve_existing(&path)
        .map_err(BoardError::from)?;

    let metadata = tokio::fs::metadata(&file_path).await?;
    if !metadata.is_file() {
        return Err(BoardError::not_found("File", path).into());
    }
    let file_size = metadata.len();

    let mime_type = mime_guess::from_path(&file_path)
        .first_or_octet_stream()
        .to_string();

    if let Some(range) = headers.get(header::RANGE) {
        let range_str = range
            .to_str()
            .map_err(|_| ServerError::BadRequest("Invalid Range header".to_string()))?;

        let Some((start, end)) = parse_range(range_str, file_size) else {
            return Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{}", file_size))
                .body(Body::empty())
                .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)));
        };

        let mut file = File::open(&file_path).await?;
        file.seek(SeekFrom::Start(start)).await?;
        let content_length = end - start + 1;
        let body = Body::from_stream(ReaderStream::new(file.take(content_length)));

        return Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, mime_type)
            .header(header::CONTENT_LENGTH, content_length)
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, file_size),
            )
            .header(header::ACCEPT_RANGES, "bytes")
            .body(body)
            .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)));
    }

    let file = File::open(&file_path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}

/// Parse HTTP Range header
/// Formats: "bytes=start-end", "bytes=start-", "bytes=-suffix"
fn parse_range(range: &str, file_size: u64) -> Option<(u64, u64)> {
    let range = range.strip_prefix("bytes=")?;
    let (start_str, end_str) = range.split_once('-')?;

    if file_size == 0 {
        return None;
    }

    if start_str.is_empty() {
        let suffix: u64 = end_str.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        return Some((file_size.saturating_sub(suffix), file_size - 1));
    }

    let start: u64 = start_str.parse().ok()?;
    let end: u64 = if end_str.is_empty() {
        file_size - 1
    } else {
        end_str.parse::<u64>().ok()?.min(file_size - 1)
    };

    (start <= end).then_some((start, end))
}
