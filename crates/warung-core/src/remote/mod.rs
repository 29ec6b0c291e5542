//! Remote sync: a path-addressed content store with revision tokens, and the
//! client that maps catalog and image operations onto it.

mod github;
mod memory;
mod sync;

use serde::{Deserialize, Serialize};

pub use github::{classify_failure, GithubContentStore};
pub use memory::MemoryContentStore;
pub use sync::{
    parse_remote_catalog, BatchFailure, BatchProgress, BatchReport, SyncClient, UploadFile,
    UploadSource,
};

use crate::error::Result;

/// A file read from the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub revision: String,
}

/// A directory entry in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    pub revision: String,
}

/// Path-keyed remote storage with optimistic concurrency.
///
/// Missing paths fail with [`crate::Error::NotFound`]; a stale or missing
/// revision on a conditional write fails with [`crate::Error::Conflict`].
#[allow(async_fn_in_trait)]
pub trait ContentStore {
    async fn get(&self, path: &str) -> Result<RemoteFile>;

    /// Current revision of the file at `path`, without its content.
    async fn revision(&self, path: &str) -> Result<String>;

    /// Write `content` at `path`. `expected_revision` is `None` only when
    /// creating a new file. Returns the new revision.
    async fn put(
        &self,
        path: &str,
        content: &[u8],
        expected_revision: Option<&str>,
        message: &str,
    ) -> Result<String>;

    async fn delete(&self, path: &str, revision: &str, message: &str) -> Result<()>;

    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>>;
}
