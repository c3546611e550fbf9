/// Core error types for the soundboard
use thiserror::Error;

/// Result type alias using `BoardError`
pub type Result<T> = std::result::Result<T, BoardError>;

/// Flat classification of every failure the library and dispatcher report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed request field
    InvalidInput,
    /// Extension not on the audio allow-list
    InvalidFileType,
    /// Path escapes the library root
    Traversal,
    /// Source file or folder absent
    NotFound,
    /// Duplicate folder
    AlreadyExists,
    /// Name is empty after sanitization
    InvalidName,
    /// Folder still contains files
    NotEmpty,
    /// Remote fetch exceeded its deadline
    Timeout,
    /// Remote fetch failed at transport or HTTP level
    DownloadFailed,
    /// Remote URL could not be parsed or has an unsupported scheme
    InvalidUrl,
    /// I/O error during write, move or delete
    StorageFailure,
}

/// Core error type for the soundboard
#[derive(Error, Debug)]
pub enum BoardError {
    /// Missing or malformed request field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Extension not on the audio allow-list
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// Path escapes the library root
    #[error("Invalid path: {0}")]
    Traversal(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What was looked up ("Sound", "Folder", ...)
        entity: String,
        /// The identifier the caller supplied
        id: String,
    },

    /// Folder already exists
    #[error("Folder already exists: {0}")]
    AlreadyExists(String),

    /// Name was emptied by sanitization
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Folder still contains files
    #[error("Folder is not empty: {0}")]
    NotEmpty(String),

    /// Remote fetch exceeded its deadline
    #[error("Download timed out: {0}")]
    Timeout(String),

    /// Remote fetch failed
    #[error("Download failed: {message}")]
    DownloadFailed {
        /// Description of the failure
        message: String,
        /// HTTP status returned by the remote, if it answered at all
        status: Option<u16>,
    },

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O failure while touching the library
    #[error("Storage error: {context}: {source}")]
    Storage {
        /// What was being attempted
        context: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl BoardError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidFileType(_) => ErrorKind::InvalidFileType,
            Self::Traversal(_) => ErrorKind::Traversal,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidName(_) => ErrorKind::InvalidName,
            Self::NotEmpty(_) => ErrorKind::NotEmpty,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::Storage { .. } => ErrorKind::StorageFailure,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid file type error
    pub fn invalid_file_type(name: impl Into<String>) -> Self {
        Self::InvalidFileType(name.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a download failure without an HTTP status
    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: msg.into(),
            status: None,
        }
    }

    /// Wrap an I/O error with what was being attempted
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }
}
