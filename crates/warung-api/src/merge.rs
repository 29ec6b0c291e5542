//! File-backed product list that pushed documents are appended to.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub added: usize,
    pub total: usize,
}

/// Appends are plain concatenation; records are not compared by identity.
#[derive(Debug)]
pub struct ProductsFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ProductsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents. A missing file, or one that is not a JSON array,
    /// reads as empty.
    pub async fn read_all(&self) -> Result<Vec<Value>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(AppError::storage(format!(
                    "Failed to read {}: {error}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => Ok(items),
            _ => {
                tracing::warn!(
                    "{} does not hold a JSON array; treating it as empty",
                    self.path.display()
                );
                Ok(Vec::new())
            }
        }
    }

    pub async fn append(&self, items: Vec<Value>) -> Result<MergeSummary, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut merged = self.read_all().await?;
        let added = items.len();
        merged.extend(items);

        let serialized = serde_json::to_string_pretty(&merged)
            .map_err(|error| AppError::storage(format!("Failed to serialize products: {error}")))?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::storage(format!("Failed to create {}: {error}", parent.display()))
            })?;
        }
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|error| {
                AppError::storage(format!("Failed to write {}: {error}", self.path.display()))
            })?;

        Ok(MergeSummary {
            added,
            total: merged.len(),
        })
    }
}
