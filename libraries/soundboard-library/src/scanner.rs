//! Directory scanning for audio files

use soundboard_core::{is_audio_extension, Catalog, Sound, MAIN_FOLDER};
use std::io;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Check if a file has an allow-listed audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(is_audio_extension)
        .unwrap_or(false)
}

/// Dot-prefixed entries below the root are never part of the library
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Walk `root` recursively and group audio files by their top-level folder
///
/// Files directly in the root are grouped under [`MAIN_FOLDER`]; anything
/// deeper is grouped by the root's immediate child it lives under.
pub fn scan_catalog(root: &Path) -> Catalog {
    let mut catalog = Catalog::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable library entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };

        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        let folder = if parts.len() == 1 {
            MAIN_FOLDER.to_string()
        } else {
            parts[0].clone()
        };

        catalog.insert(folder, Sound::from_relative_path(parts.join("/")));
    }

    catalog.sort();
    catalog
}

/// Names of the visible directories directly under `root`, sorted
pub fn top_level_folders(root: &Path) -> io::Result<Vec<String>> {
    let mut folders = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            folders.push(name);
        }
    }
    folders.sort();
    Ok(folders)
}

/// Whether `dir` holds at least one regular file at its top level
///
/// Sub-directories do not count.
pub fn has_top_level_files(dir: &Path) -> io::Result<bool> {
    for entry in std::fs::read_dir(dir)? {
        if entry?.file_type()?.is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("song.mp3")));
        assert!(is_audio_file(Path::new("song.FLAC")));
        assert!(is_audio_file(Path::new("dir/song.m4a")));
        assert!(!is_audio_file(Path::new("song.txt")));
        assert!(!is_audio_file(Path::new("song")));
        assert!(!is_audio_file(Path::new("mp3")));
    }

    #[test]
    fn test_scan_groups_by_top_level_folder() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("tone.mp3"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();
        fs::create_dir_all(root.join("Jokes/old")).unwrap();
        fs::write(root.join("Jokes/rim_shot.wav"), b"").unwrap();
        fs::write(root.join("Jokes/old/boo.OGG"), b"").unwrap();

        let catalog = scan_catalog(root);

        assert_eq!(catalog.folder_names(), vec!["Main", "Jokes"]);
        assert_eq!(catalog.folder("Main").unwrap().len(), 1);

        let jokes: Vec<_> = catalog
            .folder("Jokes")
            .unwrap()
            .iter()
            .map(|s| s.relative_path.as_str())
            .collect();
        assert_eq!(jokes, vec!["Jokes/old/boo.OGG", "Jokes/rim_shot.wav"]);
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".trash")).unwrap();
        fs::write(temp.path().join(".trash/gone.mp3"), b"").unwrap();
        fs::write(temp.path().join(".partial.mp3"), b"").unwrap();

        assert!(scan_catalog(temp.path()).is_empty());
    }

    #[test]
    fn test_top_level_folders_sorted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Zoo")).unwrap();
        fs::create_dir(temp.path().join("Animals")).unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join("file.mp3"), b"").unwrap();

        assert_eq!(
            top_level_folders(temp.path()).unwrap(),
            vec!["Animals".to_string(), "Zoo".to_string()]
        );
    }

    #[test]
    fn test_has_top_level_files_ignores_subdirectories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested/deeper")).unwrap();
        assert!(!has_top_level_files(temp.path()).unwrap());

        fs::write(temp.path().join("nested/deeper/x.mp3"), b"").unwrap();
        assert!(!has_top_level_files(temp.path()).unwrap());

        fs::write(temp.path().join("readme.txt"), b"").unwrap();
        assert!(has_top_level_files(temp.path()).unwrap());
    }
}
