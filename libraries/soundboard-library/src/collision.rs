//! Filename collision resolution
//!
//! `song.mp3` -> `song_1.mp3` -> `song_2.mp3` etc.
//!
//! [`resolve_collision`] only probes for existence, so two writers can still
//! pick the same name between the probe and the write. [`reserve`] closes
//! that gap by creating the file with `create_new` and probing again when
//! another writer got there first.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// First name in `stem.ext`, `stem_1.ext`, `stem_2.ext`, ... that does not
/// exist in `dir`
pub fn resolve_collision(dir: &Path, desired: &str) -> String {
    if !dir.join(desired).exists() {
        return desired.to_string();
    }

    let (stem, extension) = split_name(desired);
    (1u64..)
        .map(|counter| numbered(stem, extension, counter))
        .find(|candidate| !dir.join(candidate).exists())
        .unwrap_or_else(|| desired.to_string())
}

/// Atomically claim a non-colliding name in `dir`
///
/// Returns the final name together with the freshly created, empty file.
pub fn reserve(dir: &Path, desired: &str) -> io::Result<(String, File)> {
    loop {
        let name = resolve_collision(dir, desired);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
        {
            Ok(file) => return Ok((name, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(name = %name, "Lost race for filename, probing again");
            }
            Err(e) => return Err(e),
        }
    }
}

/// Split at the last dot; names without one have no extension
fn split_name(name: &str) -> (&str, Option<&str>) {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let extension = path.extension().and_then(|e| e.to_str());
    (stem, extension)
}

fn numbered(stem: &str, extension: Option<&str>, counter: u64) -> String {
    match extension {
        Some(ext) => format!("{}_{}.{}", stem, counter, ext),
        None => format!("{}_{}", stem, counter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_collision_returns_unchanged() {
        let temp = TempDir::new().unwrap();
        assert_eq!(resolve_collision(temp.path(), "a.mp3"), "a.mp3");
    }

    #[test]
    fn test_collision_counts_up() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.mp3"), b"existing").unwrap();
        assert_eq!(resolve_collision(temp.path(), "a.mp3"), "a_1.mp3");

        fs::write(temp.path().join("a_1.mp3"), b"existing").unwrap();
        assert_eq!(resolve_collision(temp.path(), "a.mp3"), "a_2.mp3");
    }

    #[test]
    fn test_collision_fills_first_gap() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.mp3"), b"").unwrap();
        fs::write(temp.path().join("a_2.mp3"), b"").unwrap();
        assert_eq!(resolve_collision(temp.path(), "a.mp3"), "a_1.mp3");
    }

    #[test]
    fn test_collision_uses_last_dot() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("live.set.mp3"), b"").unwrap();
        assert_eq!(
            resolve_collision(temp.path(), "live.set.mp3"),
            "live.set_1.mp3"
        );
    }

    #[test]
    fn test_collision_without_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("noext"), b"").unwrap();
        assert_eq!(resolve_collision(temp.path(), "noext"), "noext_1");
    }

    #[test]
    fn test_reserve_creates_distinct_files() {
        let temp = TempDir::new().unwrap();
        let (first, _) = reserve(temp.path(), "clip.wav").unwrap();
        let (second, _) = reserve(temp.path(), "clip.wav").unwrap();
        let (third, _) = reserve(temp.path(), "clip.wav").unwrap();

        assert_eq!(first, "clip.wav");
        assert_eq!(second, "clip_1.wav");
        assert_eq!(third, "clip_2.wav");
        assert!(temp.path().join("clip_2.wav").exists());
    }

    #[test]
    fn test_reserve_concurrent_writers_never_share_a_name() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = dir.clone();
                std::thread::spawn(move || reserve(&dir, "race.mp3").unwrap().0)
            })
            .collect();

        let mut names: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
    }
}
