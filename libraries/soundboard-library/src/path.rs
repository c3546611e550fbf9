//! Path resolution against the library root
//!
//! Every user-supplied path or folder name goes through [`PathResolver`]
//! before touching the filesystem. Normalization is lexical (no symlink
//! resolution) and containment is checked component-wise, so `/lib` is never
//! accepted as an ancestor of `/library`.

use crate::sanitize::sanitize_folder_name;
use soundboard_core::{BoardError, MAIN_FOLDER};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Reasons a user path is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Normalized path is not a descendant of the root
    #[error("Path escapes the library root: {0}")]
    Traversal(String),

    /// Name is empty or unusable after sanitization
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Path is safe but nothing exists there
    #[error("No such file: {0}")]
    NotFound(String),
}

impl From<PathError> for BoardError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::Traversal(path) => BoardError::Traversal(path),
            PathError::InvalidName(name) => BoardError::InvalidName(name),
            PathError::NotFound(path) => BoardError::not_found("File", path),
        }
    }
}

/// Resolves user input to absolute paths inside one library root
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for `root`
    ///
    /// The root is canonicalized once so that later containment checks
    /// compare like with like.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    /// The canonical library root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize `user_path`, join it to the root and check containment
    ///
    /// Absolute inputs replace the root (as `Path::join` does) and are then
    /// accepted only if they still land inside it.
    pub fn resolve(&self, user_path: &str) -> Result<PathBuf, PathError> {
        if user_path.contains('\0') {
            return Err(PathError::InvalidName(user_path.to_string()));
        }

        let joined = self.root.join(user_path);
        let normalized = normalize(&joined);

        if normalized.starts_with(&self.root) {
            Ok(normalized)
        } else {
            tracing::warn!(path = %user_path, "Rejected path outside library root");
            Err(PathError::Traversal(user_path.to_string()))
        }
    }

    /// Like [`resolve`](Self::resolve), but the target must exist and its
    /// canonical form (symlinks followed) must still be inside the root
    pub fn resolve_existing(&self, user_path: &str) -> Result<PathBuf, PathError> {
        let resolved = self.resolve(user_path)?;
        let canonical = resolved
            .canonicalize()
            .map_err(|_| PathError::NotFound(user_path.to_string()))?;

        if canonical.starts_with(&self.root) {
            Ok(resolved)
        } else {
            tracing::warn!(path = %user_path, "Rejected symlink leading outside library root");
            Err(PathError::Traversal(user_path.to_string()))
        }
    }

    /// Resolve a folder name to its directory
    ///
    /// `"Main"` and the empty string map to the root. Any other input is
    /// sanitized into a single path segment first, never treated as a
    /// multi-segment path. Returns the sanitized name with the directory.
    pub fn folder(&self, name: &str) -> Result<(String, PathBuf), PathError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed == MAIN_FOLDER {
            return Ok((MAIN_FOLDER.to_string(), self.root.clone()));
        }

        let clean = sanitize_folder_name(trimmed);
        if clean.is_empty() {
            return Err(PathError::InvalidName(name.to_string()));
        }

        let dir = self.resolve(&clean)?;
        Ok((clean, dir))
    }

    /// Root-relative form of an absolute path, with `/` separators
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

/// Lexically collapse `.`, `..` and redundant separators
///
/// `..` at the filesystem root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
