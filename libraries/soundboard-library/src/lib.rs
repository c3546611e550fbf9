//! Soundboard Library
//!
//! Treats one directory tree as a two-level namespace of folders and sounds.
//!
//! # Architecture
//!
//! - `path`: Path Resolver; every user path goes through it
//! - `sanitize`: filename and folder-name sanitization
//! - `collision`: `name.ext` -> `name_1.ext` collision resolution
//! - `scanner`: recursive catalog scan and folder inspection
//! - `manager`: list, upload, move, folder creation and removal
//! - `ingest`: streaming download of remote sounds into the library
//!
//! # Example
//!
//! ```no_run
//! use soundboard_library::LibraryManager;
//!
//! # fn main() -> soundboard_core::Result<()> {
//! let library = LibraryManager::new("/srv/sounds")?;
//! let stored = library.upload(b"RIFF....", "rim shot.wav", Some("Jokes"))?;
//! assert_eq!(stored.relative_path, "Jokes/rim_shot.wav");
//!
//! for (folder, sounds) in library.list().iter() {
//!     println!("{}: {} sounds", folder, sounds.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod collision;
pub mod ingest;
pub mod manager;
pub mod path;
pub mod sanitize;
pub mod scanner;

pub use collision::{reserve, resolve_collision};
pub use ingest::{IngestConfig, UrlIngestor};
pub use manager::{LibraryManager, PendingUpload, StoredSound};
pub use path::{PathError, PathResolver};
