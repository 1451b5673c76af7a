//! File-backed storage backend.
//!
//! One file per key under a root directory. Key strings are
//! percent-escaped into filenames so arbitrary keys (separators, dots,
//! Unicode) cannot escape the directory or collide with each other.
//!
//! Entries are small (stored text produced by a codec), so plain
//! synchronous `std::fs` calls inside the async methods are acceptable;
//! there is no WAL, no fsync discipline, and no durability promise
//! beyond what the filesystem provides.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use keymirror_core::{BackendError, StorageBackend};
use tracing::debug;

/// File-per-key backend rooted at a directory.
///
/// The async methods perform synchronous `std::fs` calls, blocking the
/// executor thread for the duration of one small file operation. Wrap
/// the backend in `tokio::task::spawn_blocking` if that pause is
/// unacceptable on your runtime.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a backend at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened file backend");
        Ok(Self { dir })
    }

    /// The root directory entries are stored under.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(escape_key(key))
    }
}

/// Escape a key into a safe filename.
///
/// ASCII alphanumerics plus `-` and `_` pass through; every other byte
/// becomes `%XX`. The mapping is injective, so distinct keys never
/// collide.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(byte as char),
            _ => {
                // Infallible for String
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, key: &str, text: &str) -> Result<(), BackendError> {
        std::fs::write(self.entry_path(key), text)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            // Idempotent: removing an absent key is not an error
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
