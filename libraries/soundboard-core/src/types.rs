//! Domain types for the soundboard
//!
//! A library is a two-level namespace: folders (direct children of the root,
//! plus the root itself under the name [`MAIN_FOLDER`]) containing sounds.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Canonical name of the library root when presented as a folder
pub const MAIN_FOLDER: &str = "Main";

/// Supported audio file extensions (matched case-insensitively)
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac", "aac", "m4a"];

/// Check an extension (without the dot) against the allow-list
pub fn is_audio_extension(ext: &str) -> bool {
    AUDIO_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
}

/// One playable audio file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sound {
    /// Filename without extension, `-` and `_` rendered as spaces
    pub display_name: String,

    /// Path from the library root with `/` separators; stable identifier for
    /// playback and move requests
    #[serde(rename = "full_path")]
    pub relative_path: String,
}

impl Sound {
    /// Build a sound from its root-relative path
    pub fn from_relative_path(relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        let display_name = display_name_for(&relative_path);
        Self {
            display_name,
            relative_path,
        }
    }
}

/// Presentation name for a file: stem with dashes and underscores as spaces
pub fn display_name_for(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .replace(['-', '_'], " ")
}

/// Folder-grouped view of the library
///
/// Iteration and serialization yield [`MAIN_FOLDER`] first, then the
/// remaining folders alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    folders: BTreeMap<String, Vec<Sound>>,
}

impl Catalog {
    /// Add a sound under `folder`
    pub fn insert(&mut self, folder: impl Into<String>, sound: Sound) {
        self.folders.entry(folder.into()).or_default().push(sound);
    }

    /// Order every folder's sounds by display name (ties broken by path)
    pub fn sort(&mut self) {
        for sounds in self.folders.values_mut() {
            sounds.sort_by(|a, b| {
                a.display_name
                    .cmp(&b.display_name)
                    .then_with(|| a.relative_path.cmp(&b.relative_path))
            });
        }
    }

    /// Sounds in one folder
    pub fn folder(&self, name: &str) -> Option<&[Sound]> {
        self.folders.get(name).map(Vec::as_slice)
    }

    /// Folders in presentation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Sound])> {
        let main = self
            .folders
            .get_key_value(MAIN_FOLDER)
            .map(|(k, v)| (k.as_str(), v.as_slice()));
        let rest = self
            .folders
            .iter()
            .filter(|(k, _)| k.as_str() != MAIN_FOLDER)
            .map(|(k, v)| (k.as_str(), v.as_slice()));
        main.into_iter().chain(rest)
    }

    /// Folder names in presentation order
    pub fn folder_names(&self) -> Vec<&str> {
        self.iter().map(|(name, _)| name).collect()
    }

    /// All sounds as one list ordered by display name
    pub fn flatten(&self) -> Vec<Sound> {
        let mut all: Vec<Sound> = self.folders.values().flatten().cloned().collect();
        all.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });
        all
    }

    /// True when the library holds no sounds
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Total number of sounds
    pub fn len(&self) -> usize {
        self.folders.values().map(Vec::len).sum()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.folders.len()))?;
        for (name, sounds) in self.iter() {
            map.serialize_entry(name, sounds)?;
        }
        map.end()
    }
}

/// A folder that could not be removed, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRemoval {
    /// Folder name as requested
    pub name: String,
    /// Why it was left in place
    pub reason: String,
}

/// Outcome of a batch folder removal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Folders deleted, in request order
    pub removed: Vec<String>,
    /// Folders left in place
    pub failed: Vec<FailedRemoval>,
}

impl RemovalReport {
    /// True when at least one requested folder was not removed
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Record a folder that was not removed
    pub fn record_failure(&mut self, name: &str, reason: impl Into<String>) {
        self.failed.push(FailedRemoval {
            name: name.to_string(),
            reason: reason.into(),
        });
    }

    /// Record a folder that was removed
    pub fn record_removed(&mut self, name: &str) {
        self.removed.push(name.to_string());
    }
}
