//! Durable storage for the serialized catalog snapshot

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// A single persisted blob holding the whole catalog.
pub trait SnapshotStore {
    /// Read the stored snapshot, `None` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored snapshot.
    fn write(&self, contents: &str) -> Result<()>;
}

/// Snapshot kept in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshot {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::Io(error)),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename so a failed write never truncates the previous snapshot.
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// In-memory snapshot, shared between clones (primarily for tests).
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing snapshot text.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }
}

impl SnapshotStore for MemorySnapshot {
    fn read(&self) -> Result<Option<String>> {
        let guard = self
            .contents
            .lock()
            .map_err(|error| Error::Io(io::Error::other(error.to_string())))?;
        Ok(guard.clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|error| Error::Io(io::Error::other(error.to_string())))?;
        *guard = Some(contents.to_string());
        Ok(())
    }
}
