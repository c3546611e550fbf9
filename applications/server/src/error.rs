/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use soundboard_core::BoardError;
use soundboard_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Library(#[from] BoardError),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PlaybackError> for ServerError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Library(e) => ServerError::Library(e),
            other => ServerError::Playback(other.to_string()),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Library(e) => library_status(e),
            ServerError::Playback(_)
            | ServerError::Internal(_)
            | ServerError::Config(_)
            | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn library_status(err: &BoardError) -> StatusCode {
    match err {
        BoardError::InvalidInput(_)
        | BoardError::InvalidFileType(_)
        | BoardError::Traversal(_)
        | BoardError::InvalidName(_)
        | BoardError::AlreadyExists(_)
        | BoardError::InvalidUrl(_)
        | BoardError::NotEmpty(_) => StatusCode::BAD_REQUEST,
        BoardError::NotFound { .. } => StatusCode::NOT_FOUND,
        BoardError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        BoardError::DownloadFailed {
            status: Some(_), ..
        } => StatusCode::BAD_REQUEST,
        BoardError::DownloadFailed { status: None, .. } | BoardError::Storage { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Client-facing message; storage details stay in the logs
fn library_message(err: &BoardError) -> String {
    match err {
        BoardError::InvalidFileType(_) => {
            "Invalid file type. Only audio files are allowed.".to_string()
        }
        BoardError::InvalidInput(msg) => msg.clone(),
        BoardError::Storage { context, .. } => context.clone(),
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            ServerError::BadRequest(msg) | ServerError::PayloadTooLarge(msg) => msg,
            ServerError::Library(ref e) => {
                if status.is_server_error() {
                    tracing::error!("Library error: {:?}", e);
                } else {
                    tracing::debug!("Rejected request: {}", e);
                }
                library_message(e)
            }
            ServerError::Playback(ref msg) => {
                tracing::error!("Playback error: {}", msg);
                "Playback unavailable".to_string()
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                "Configuration error".to_string()
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                "IO error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (BoardError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (BoardError::invalid_file_type("x"), StatusCode::BAD_REQUEST),
            (BoardError::Traversal("x".into()), StatusCode::BAD_REQUEST),
            (BoardError::AlreadyExists("x".into()), StatusCode::BAD_REQUEST),
            (BoardError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (BoardError::not_found("File", "x"), StatusCode::NOT_FOUND),
            (BoardError::Timeout("x".into()), StatusCode::REQUEST_TIMEOUT),
            (
                BoardError::DownloadFailed {
                    message: "x".into(),
                    status: Some(404),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                BoardError::download_failed("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                BoardError::storage("x", std::io::Error::other("disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ServerError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_invalid_file_type_message() {
        let err = BoardError::invalid_file_type("notes.txt");
        assert_eq!(
            library_message(&err),
            "Invalid file type. Only audio files are allowed."
        );
    }

    #[test]
    fn test_playback_error_conversion() {
        let err = ServerError::from(PlaybackError::Library(BoardError::Traversal("x".into())));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ServerError::from(PlaybackError::DispatcherStopped);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
