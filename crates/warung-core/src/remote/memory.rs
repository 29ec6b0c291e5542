//! In-memory [`ContentStore`] with GitHub-like revision semantics.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ContentStore, RemoteEntry, RemoteFile};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, RemoteFile>,
    failures: HashMap<String, u16>,
    withheld: HashSet<String>,
    next_revision: u64,
    writes: Vec<String>,
}

/// Shared in-memory content store; clones see the same files.
///
/// Failures can be injected per path with [`MemoryContentStore::fail_path`].
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    state: Arc<Mutex<State>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, returning its revision.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) -> Result<String> {
        let mut state = self.lock()?;
        let revision = state.bump();
        state.files.insert(
            path.to_string(),
            RemoteFile {
                content: content.into(),
                revision: revision.clone(),
            },
        );
        Ok(revision)
    }

    /// Make every operation on `path` fail with the given HTTP status.
    pub fn fail_path(&self, path: &str, status: u16) -> Result<()> {
        self.lock()?.failures.insert(path.to_string(), status);
        Ok(())
    }

    /// Make `get` refuse to return the body of `path`, as GitHub does for
    /// files over 1 MB. Revision lookups still succeed.
    pub fn withhold_content(&self, path: &str) -> Result<()> {
        self.lock()?.withheld.insert(path.to_string());
        Ok(())
    }

    pub fn contents(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.files.get(path).map(|file| file.content.clone()))
    }

    pub fn paths(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.files.keys().cloned().collect())
    }

    /// Paths written or deleted, in call order.
    pub fn write_log(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.writes.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|error| Error::Remote {
                status: 0,
                message: format!("memory store poisoned: {error}"),
            })
    }
}

impl State {
    fn bump(&mut self) -> String {
        self.next_revision += 1;
        format!("rev-{}", self.next_revision)
    }

    fn check_failure(&self, path: &str) -> Result<()> {
        match self.failures.get(path) {
            Some(status) => Err(Error::Remote {
                status: *status,
                message: format!("injected failure for {path}"),
            }),
            None => Ok(()),
        }
    }
}

impl ContentStore for MemoryContentStore {
    async fn get(&self, path: &str) -> Result<RemoteFile> {
        let state = self.lock()?;
        state.check_failure(path)?;
        if state.withheld.contains(path) && state.files.contains_key(path) {
            return Err(Error::Remote {
                status: 200,
                message: format!("content of {path} is too large to return inline"),
            });
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn revision(&self, path: &str) -> Result<String> {
        let state = self.lock()?;
        state.check_failure(path)?;
        state
            .files
            .get(path)
            .map(|file| file.revision.clone())
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        expected_revision: Option<&str>,
        _message: &str,
    ) -> Result<String> {
        let mut state = self.lock()?;
        state.check_failure(path)?;

        let current = state.files.get(path).map(|file| file.revision.as_str());
        match (current, expected_revision) {
            (None, None) => {}
            (Some(current), Some(expected)) if current == expected => {}
            (Some(_), None) => {
                return Err(Error::Conflict {
                    path: path.to_string(),
                    message: "file exists and no revision was supplied".to_string(),
                })
            }
            (_, Some(expected)) => {
                return Err(Error::Conflict {
                    path: path.to_string(),
                    message: format!("revision {expected} does not match"),
                })
            }
        }

        let revision = state.bump();
        state.files.insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                revision: revision.clone(),
            },
        );
        state.writes.push(path.to_string());
        Ok(revision)
    }

    async fn delete(&self, path: &str, revision: &str, _message: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.check_failure(path)?;

        let current = state
            .files
            .get(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        if current.revision != revision {
            return Err(Error::Conflict {
                path: path.to_string(),
                message: format!("revision {revision} does not match"),
            });
        }
        state.files.remove(path);
        state.writes.push(path.to_string());
        Ok(())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let state = self.lock()?;
        state.check_failure(path)?;

        let prefix = format!("{}/", path.trim_matches('/'));
        let entries: Vec<RemoteEntry> = state
            .files
            .iter()
            .filter_map(|(file_path, file)| {
                let name = file_path.strip_prefix(&prefix)?;
                (!name.contains('/')).then(|| RemoteEntry {
                    name: name.to_string(),
                    path: file_path.clone(),
                    revision: file.revision.clone(),
                })
            })
            .collect();

        if entries.is_empty() {
            return Err(Error::NotFound(path.to_string()));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_requires_matching_revision() {
        let store = MemoryContentStore::new();
        let first = store.put("a.json", b"1", None, "create").await.unwrap();

        let error = store.put("a.json", b"2", None, "blind").await.unwrap_err();
        assert!(error.is_conflict());

        let error = store
            .put("a.json", b"2", Some("stale"), "stale")
            .await
            .unwrap_err();
        assert!(error.is_conflict());

        let second = store.put("a.json", b"2", Some(&first), "update").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.contents("a.json").unwrap().unwrap(), b"2");
    }

    #[tokio::test]
    async fn delete_checks_revision_and_existence() {
        let store = MemoryContentStore::new();
        let revision = store.insert("images/a.jpg", b"x".to_vec()).unwrap();

        assert!(store
            .delete("images/a.jpg", "nope", "rm")
            .await
            .unwrap_err()
            .is_conflict());
        store.delete("images/a.jpg", &revision, "rm").await.unwrap();
        assert!(store
            .delete("images/a.jpg", &revision, "rm")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn list_dir_returns_direct_children_only() {
        let store = MemoryContentStore::new();
        store.insert("images/a.jpg", b"a".to_vec()).unwrap();
        store.insert("images/thumbs/a.jpg", b"t".to_vec()).unwrap();
        store.insert("data/products.json", b"[]".to_vec()).unwrap();

        let entries = store.list_dir("images").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.jpg");
        assert!(store.list_dir("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn withheld_content_still_reports_revision() {
        let store = MemoryContentStore::new();
        let revision = store.insert("images/foto.jpg", vec![0u8; 16]).unwrap();
        store.withhold_content("images/foto.jpg").unwrap();

        assert!(store.get("images/foto.jpg").await.is_err());
        assert_eq!(store.revision("images/foto.jpg").await.unwrap(), revision);
        assert!(store.revision("images/none.jpg").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn injected_failure_surfaces_as_remote_error() {
        let store = MemoryContentStore::new();
        store.fail_path("bad.jpg", 502).unwrap();
        let error = store.put("bad.jpg", b"x", None, "up").await.unwrap_err();
        assert!(matches!(error, Error::Remote { status: 502, .. }));
    }
}
