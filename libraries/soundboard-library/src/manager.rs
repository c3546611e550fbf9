//! Sound library manager
//!
//! Stateless between calls: every operation re-derives what it needs from
//! disk. All methods perform blocking filesystem I/O; async callers should
//! run them on a blocking worker (`tokio::task::spawn_blocking`).

use crate::collision::reserve;
use crate::path::PathResolver;
use crate::sanitize::{sanitize_filename, sanitize_folder_name};
use crate::scanner::{has_top_level_files, is_audio_file, scan_catalog, top_level_folders};
use serde::Serialize;
use soundboard_core::{BoardError, Catalog, RemovalReport, Result, MAIN_FOLDER};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where a new or relocated sound ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSound {
    /// Final filename after sanitization and collision resolution
    pub filename: String,
    /// Folder the sound was placed in (`"Main"` for the root)
    pub folder: String,
    /// Root-relative path, usable for playback and moves
    pub relative_path: String,
}

/// Staging name for uploads still being received
const STAGING_NAME: &str = ".upload.part";

/// An upload whose bytes are still being written to a staging file
#[derive(Debug)]
pub struct PendingUpload {
    filename: String,
    staging: PathBuf,
}

impl PendingUpload {
    /// Sanitized name the sound will be stored under (before collisions)
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// Manages a directory tree as a folder -> sound namespace
#[derive(Debug, Clone)]
pub struct LibraryManager {
    resolver: PathResolver,
}

impl LibraryManager {
    /// Open the library rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let resolver = PathResolver::new(root).map_err(|e| {
            BoardError::storage(format!("Cannot open library root {}", root.display()), e)
        })?;
        Ok(Self { resolver })
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Folder-grouped catalog of every audio file in the library
    pub fn list(&self) -> Catalog {
        let catalog = scan_catalog(self.root());
        tracing::debug!(
            folders = catalog.folder_names().len(),
            sounds = catalog.len(),
            "Scanned library"
        );
        catalog
    }

    /// `"Main"` plus the root's sub-directories, sorted as one list
    pub fn folders(&self) -> Vec<String> {
        let mut folders = vec![MAIN_FOLDER.to_string()];
        match top_level_folders(self.root()) {
            Ok(found) => folders.extend(found.into_iter().filter(|f| f != MAIN_FOLDER)),
            Err(e) => tracing::warn!("Error reading sounds directory: {}", e),
        }
        folders.sort();
        folders
    }

    /// Store uploaded bytes as a new sound in `target_folder`
    ///
    /// A missing folder is created. Returns the stored location; on write
    /// failure the partial file is removed and the error surfaced.
    pub fn upload(
        &self,
        data: &[u8],
        original_name: &str,
        target_folder: Option<&str>,
    ) -> Result<StoredSound> {
        let (pending, mut file) = self.begin_upload(original_name)?;

        if let Err(e) = file.write_all(data).and_then(|()| file.flush()) {
            drop(file);
            self.abandon_upload(pending);
            return Err(BoardError::storage("Failed to save file", e));
        }
        drop(file);

        self.commit_upload(pending, target_folder)
    }

    /// Validate `original_name` and open a hidden staging file for its bytes
    ///
    /// The caller writes the content into the returned file, then either
    /// [`commit_upload`](Self::commit_upload)s it into a folder or
    /// [`abandon_upload`](Self::abandon_upload)s it. Staging files are dot
    /// files in the root, so listings never show them.
    pub fn begin_upload(&self, original_name: &str) -> Result<(PendingUpload, fs::File)> {
        let filename = self.validate_audio_name(original_name)?;
        let (staging_name, file) = reserve(self.root(), STAGING_NAME)
            .map_err(|e| BoardError::storage("Failed to save file", e))?;

        let pending = PendingUpload {
            filename,
            staging: self.root().join(staging_name),
        };
        tracing::debug!(staging = %pending.staging.display(), "Staging upload");
        Ok((pending, file))
    }

    /// Move a fully written staging file to its final, collision-free name
    pub fn commit_upload(
        &self,
        pending: PendingUpload,
        target_folder: Option<&str>,
    ) -> Result<StoredSound> {
        let placed = self
            .prepare_folder(target_folder.unwrap_or(MAIN_FOLDER))
            .and_then(|(folder, dir)| {
                let (final_name, placeholder) = reserve(&dir, &pending.filename)
                    .map_err(|e| BoardError::storage("Failed to save file", e))?;
                drop(placeholder);
                let path = dir.join(&final_name);
                relocate(&pending.staging, &path)?;
                Ok((folder, final_name, path))
            });

        let (folder, final_name, path) = match placed {
            Ok(placed) => placed,
            Err(e) => {
                self.abandon_upload(pending);
                return Err(e);
            }
        };

        let bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or_default();
        let stored = self.stored(&folder, final_name, &path);
        tracing::info!(path = %stored.relative_path, bytes, "Uploaded sound");
        Ok(stored)
    }

    /// Drop a staging file that will not be committed
    pub fn abandon_upload(&self, pending: PendingUpload) {
        tracing::debug!(staging = %pending.staging.display(), "Discarding upload");
        discard(&pending.staging);
    }

    /// Move a sound into `target_folder`, renaming on collision
    ///
    /// Returns the new root-relative path. Moving a sound into the folder it
    /// already lives in leaves it untouched.
    pub fn move_sound(&self, source: &str, target_folder: &str) -> Result<String> {
        let source_path = self.resolver.resolve_existing(source)?;
        if !source_path.is_file() {
            return Err(BoardError::invalid_input(format!(
                "Source is not a file: {}",
                source
            )));
        }

        let (folder, dir) = self.prepare_folder(target_folder)?;

        if source_path.parent() == Some(dir.as_path()) {
            tracing::debug!(source = %source, folder = %folder, "Sound already in target folder");
            return Ok(self.relative(&source_path));
        }

        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BoardError::invalid_input(format!("Invalid source path: {}", source)))?
            .to_string();

        let (final_name, placeholder) = reserve(&dir, &filename)
            .map_err(|e| BoardError::storage("Failed to move file", e))?;
        drop(placeholder);
        let dest = dir.join(&final_name);

        relocate(&source_path, &dest)?;

        let new_path = self.relative(&dest);
        tracing::info!(from = %source, to = %new_path, "Moved sound");
        Ok(new_path)
    }

    /// Create an empty folder under the root
    ///
    /// Returns the sanitized folder name.
    pub fn create_folder(&self, name: &str) -> Result<String> {
        let clean = sanitize_folder_name(name);
        if clean.is_empty() {
            return Err(BoardError::InvalidName(name.to_string()));
        }
        if clean == MAIN_FOLDER {
            return Err(BoardError::AlreadyExists(clean));
        }

        let dir = self.resolver.resolve(&clean)?;
        match fs::create_dir(&dir) {
            Ok(()) => {
                tracing::info!(folder = %clean, "Created folder");
                Ok(clean)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(BoardError::AlreadyExists(clean))
            }
            Err(e) => Err(BoardError::storage(
                format!("Failed to create folder {}", clean),
                e,
            )),
        }
    }

    /// Folders (never `"Main"`) with no regular files at their top level
    pub fn list_empty_folders(&self) -> Result<Vec<String>> {
        let folders = top_level_folders(self.root())
            .map_err(|e| BoardError::storage("Failed to read sounds directory", e))?;

        Ok(folders
            .into_iter()
            .filter(|name| name != MAIN_FOLDER)
            .filter(|name| match has_top_level_files(&self.root().join(name)) {
                Ok(has_files) => !has_files,
                Err(e) => {
                    tracing::warn!(folder = %name, "Failed to inspect folder: {}", e);
                    false
                }
            })
            .collect())
    }

    /// Delete each named folder if it is still empty
    ///
    /// Every precondition is checked again at deletion time since the
    /// folder may have changed since it was listed. Never fails as a whole;
    /// per-folder outcomes are in the report.
    pub fn remove_folders(&self, names: &[String]) -> RemovalReport {
        let mut report = RemovalReport::default();

        for name in names {
            match self.remove_empty_folder(name) {
                Ok(()) => {
                    tracing::info!(folder = %name, "Removed folder");
                    report.record_removed(name);
                }
                Err(reason) => {
                    tracing::debug!(folder = %name, reason = %reason, "Folder not removed");
                    report.record_failure(name, reason);
                }
            }
        }

        report
    }

    fn remove_empty_folder(&self, name: &str) -> std::result::Result<(), String> {
        if name.is_empty() || sanitize_folder_name(name) != name {
            return Err("invalid folder name".to_string());
        }
        if name == MAIN_FOLDER {
            return Err("the Main folder cannot be removed".to_string());
        }

        let dir = self
            .resolver
            .resolve(name)
            .map_err(|_| "invalid folder name".to_string())?;

        let metadata = match fs::symlink_metadata(&dir) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err("folder does not exist".to_string())
            }
            Err(e) => return Err(format!("failed to inspect folder: {}", e)),
        };
        if !metadata.is_dir() {
            return Err("not a directory".to_string());
        }

        match has_top_level_files(&dir) {
            Ok(true) => return Err("folder is not empty".to_string()),
            Ok(false) => {}
            Err(e) => return Err(format!("failed to inspect folder: {}", e)),
        }

        fs::remove_dir_all(&dir).map_err(|e| format!("failed to remove folder: {}", e))
    }

    /// Validate and sanitize an incoming filename
    ///
    /// Rejects names without an allow-listed extension, both before and
    /// after sanitization.
    pub fn validate_audio_name(&self, original_name: &str) -> Result<String> {
        if original_name.trim().is_empty() {
            return Err(BoardError::invalid_input("No file selected"));
        }
        if !is_audio_file(Path::new(original_name)) {
            return Err(BoardError::invalid_file_type(original_name));
        }

        let filename = sanitize_filename(original_name);
        if filename.is_empty() {
            return Err(BoardError::InvalidName(original_name.to_string()));
        }
        if !is_audio_file(Path::new(&filename)) {
            return Err(BoardError::invalid_file_type(original_name));
        }
        Ok(filename)
    }

    /// Resolve a target folder, creating it when it does not exist yet
    pub fn prepare_folder(&self, target_folder: &str) -> Result<(String, PathBuf)> {
        let (folder, dir) = self.resolver.folder(target_folder)?;

        if folder != MAIN_FOLDER {
            if dir.exists() && !dir.is_dir() {
                return Err(BoardError::invalid_input(format!(
                    "Not a folder: {}",
                    folder
                )));
            }
            fs::create_dir_all(&dir).map_err(|e| {
                BoardError::storage(format!("Failed to create folder {}", folder), e)
            })?;
        }

        Ok((folder, dir))
    }

    pub(crate) fn stored(&self, folder: &str, filename: String, path: &Path) -> StoredSound {
        StoredSound {
            relative_path: self.relative(path),
            folder: folder.to_string(),
            filename,
        }
    }

    fn relative(&self, path: &Path) -> String {
        self.resolver
            .relative(path)
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Rename `source` onto `dest`, falling back to copy + delete when the
/// rename fails (e.g. across devices)
///
/// `dest` is an empty placeholder reserved by the caller; it is removed
/// again if the move cannot be completed.
fn relocate(source: &Path, dest: &Path) -> Result<()> {
    let rename_err = match fs::rename(source, dest) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    tracing::debug!(
        "Rename failed ({}), falling back to copy for {}",
        rename_err,
        source.display()
    );
    copy_then_remove(source, dest)
}

fn copy_then_remove(source: &Path, dest: &Path) -> Result<()> {
    if let Err(e) = fs::copy(source, dest) {
        discard(dest);
        return Err(BoardError::storage("Failed to move file", e));
    }

    if let Err(e) = fs::remove_file(source) {
        discard(dest);
        return Err(BoardError::storage(
            "Failed to remove original after copy",
            e,
        ));
    }

    Ok(())
}

/// Best-effort removal of a file we created
pub(crate) fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("Failed to clean up {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library() -> (TempDir, LibraryManager) {
        let temp = TempDir::new().unwrap();
        let manager = LibraryManager::new(temp.path()).unwrap();
        (temp, manager)
    }

    #[test]
    fn test_validate_audio_name() {
        let (_temp, manager) = library();
        assert_eq!(
            manager.validate_audio_name("my clip.MP3").unwrap(),
            "my_clip.MP3"
        );
        assert!(matches!(
            manager.validate_audio_name("notes.txt"),
            Err(BoardError::InvalidFileType(_))
        ));
        assert!(matches!(
            manager.validate_audio_name("noextension"),
            Err(BoardError::InvalidFileType(_))
        ));
        assert!(matches!(
            manager.validate_audio_name(""),
            Err(BoardError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_relocate_moves_content() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.mp3");
        let dest = temp.path().join("b.mp3");
        fs::write(&source, b"payload").unwrap();
        fs::write(&dest, b"").unwrap();

        relocate(&source, &dest).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_copy_fallback_replaces_placeholder() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("B")).unwrap();
        let source = temp.path().join("a.mp3");
        let dest = temp.path().join("B/a.mp3");
        fs::write(&source, b"payload").unwrap();
        fs::write(&dest, b"").unwrap();

        copy_then_remove(&source, &dest).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_copy_fallback_failure_cleans_placeholder() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("b.mp3");
        fs::write(&dest, b"").unwrap();

        let err = copy_then_remove(&temp.path().join("gone.mp3"), &dest).unwrap_err();

        assert!(matches!(err, BoardError::Storage { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_relocate_missing_source_cleans_placeholder() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("b.mp3");
        fs::write(&dest, b"").unwrap();

        let err = relocate(&temp.path().join("gone.mp3"), &dest).unwrap_err();

        assert!(matches!(err, BoardError::Storage { .. }));
        assert!(!dest.exists());
    }
}
