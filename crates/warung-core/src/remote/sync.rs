//! Catalog publish/fetch and sequential image batches over a [`ContentStore`].

use std::borrow::Cow;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use super::{ContentStore, RemoteEntry};
use crate::catalog::{CatalogStore, LooseProduct, SnapshotStore};
use crate::config::join_repo_path;
use crate::error::{Error, Result};
use crate::export::render_published_json;
use crate::models::{Product, ProductId};
use crate::util::sanitize_file_name;

/// Where an upload's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    Bytes(Vec<u8>),
    /// Read only when the batch reaches this item.
    Path(PathBuf),
}

/// A file to upload under `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub source: UploadSource,
}

impl UploadFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: UploadSource::Bytes(bytes),
        }
    }

    /// Named after the path's final component. A path without one fails
    /// validation when its turn in the batch comes.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            source: UploadSource::Path(path),
        }
    }

    fn describe(&self) -> String {
        match &self.source {
            UploadSource::Path(path) => path.display().to_string(),
            UploadSource::Bytes(_) => format!("'{}'", self.name),
        }
    }

    async fn load(&self) -> Result<Cow<'_, [u8]>> {
        match &self.source {
            UploadSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            UploadSource::Path(path) => tokio::fs::read(path)
                .await
                .map(Cow::Owned)
                .map_err(|error| {
                    Error::InvalidInput(format!("Cannot read {}: {error}", path.display()))
                }),
        }
    }
}

/// Emitted after every batch item, whether it succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub path: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub path: String,
    pub message: String,
}

/// Outcome of a sequential batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: &str, result: Result<()>) -> bool {
        self.attempted += 1;
        match result {
            Ok(()) => {
                self.succeeded += 1;
                true
            }
            Err(error) => {
                tracing::warn!("Batch item {} failed: {}", path, error);
                self.failures.push(BatchFailure {
                    path: path.to_string(),
                    message: error.to_string(),
                });
                false
            }
        }
    }
}

/// Maps catalog and image operations onto a content store.
///
/// Batch operations run strictly one item at a time: item `i + 1` starts
/// only after item `i` has finished.
#[derive(Debug, Clone)]
pub struct SyncClient<C: ContentStore> {
    store: C,
}

impl<C: ContentStore> SyncClient<C> {
    pub const fn new(store: C) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &C {
        &self.store
    }

    /// Publish the catalog at `path` in the published shape (no ids).
    ///
    /// Writes conditionally on the current revision, or creates the file when
    /// none exists. Returns the new revision.
    pub async fn publish_catalog(&self, products: &[Product], path: &str) -> Result<String> {
        let document = render_published_json(products)?;
        let current = self.current_revision(path).await?;
        let revision = self
            .store
            .put(
                path,
                document.as_bytes(),
                current.as_deref(),
                &format!("Update {path}"),
            )
            .await?;
        tracing::info!("Published {} products to {}", products.len(), path);
        Ok(revision)
    }

    /// Replace the local catalog with the remote document at `path`.
    ///
    /// Every fetched record gets a fresh local id. Returns the product count.
    pub async fn fetch_catalog<S: SnapshotStore>(
        &self,
        path: &str,
        catalog: &mut CatalogStore<S>,
    ) -> Result<usize> {
        let file = self.store.get(path).await?;
        let products = parse_remote_catalog(&file.content)?;
        let count = products.len();
        catalog.replace_all(products)?;
        tracing::info!("Fetched {} products from {}", count, path);
        Ok(count)
    }

    /// Upload files into `dest_dir`, one at a time.
    ///
    /// Each file is read when its turn comes; an unreadable file is recorded
    /// as a failure like any other item. Without `overwrite`, each put is a creating write and fails with a
    /// conflict if the file already exists. With it, the current revision is
    /// looked up first.
    pub async fn upload_files_sequentially(
        &self,
        files: &[UploadFile],
        dest_dir: &str,
        overwrite: bool,
        mut progress: impl FnMut(&BatchProgress),
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let total = files.len();

        for file in files {
            let file_name = sanitize_file_name(&file.name);
            let path = join_repo_path(dest_dir, &file_name);
            let result = if file_name.is_empty() {
                Err(Error::Validation(format!(
                    "{} has no usable file name",
                    file.describe()
                )))
            } else {
                match file.load().await {
                    Ok(bytes) => self.upload_one(&path, &bytes, overwrite).await,
                    Err(error) => Err(error),
                }
            };

            let succeeded = report.record(&path, result);
            progress(&BatchProgress {
                completed: report.attempted,
                total,
                path,
                succeeded,
            });
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "Upload batch finished"
        );
        report
    }

    /// Delete each path at its current revision, one at a time.
    pub async fn delete_files(
        &self,
        paths: &[String],
        mut progress: impl FnMut(&BatchProgress),
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let total = paths.len();

        for path in paths {
            let result = self.delete_one(path).await;
            let succeeded = report.record(path, result);
            progress(&BatchProgress {
                completed: report.attempted,
                total,
                path: path.clone(),
                succeeded,
            });
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "Delete batch finished"
        );
        report
    }

    pub async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        self.store.list_dir(path).await
    }

    async fn upload_one(&self, path: &str, bytes: &[u8], overwrite: bool) -> Result<()> {
        let revision = if overwrite {
            self.current_revision(path).await?
        } else {
            None
        };
        let message = format!("Upload {path}");
        self.store
            .put(path, bytes, revision.as_deref(), &message)
            .await?;
        Ok(())
    }

    async fn delete_one(&self, path: &str) -> Result<()> {
        let revision = self.store.revision(path).await?;
        self.store
            .delete(path, &revision, &format!("Delete {path}"))
            .await
    }

    async fn current_revision(&self, path: &str) -> Result<Option<String>> {
        match self.store.revision(path).await {
            Ok(revision) => Ok(Some(revision)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Parse a fetched catalog document, assigning a fresh id to every record.
///
/// Elements that are not objects are dropped; missing fields default.
pub fn parse_remote_catalog(content: &[u8]) -> Result<Vec<Product>> {
    let text = std::str::from_utf8(content)
        .map_err(|error| Error::Format(format!("Remote catalog is not UTF-8: {error}")))?;
    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            return Err(Error::Format(
                "Remote catalog must be a JSON array".to_string(),
            ))
        }
        Err(error) => return Err(Error::Format(format!("Remote catalog is invalid: {error}"))),
    };

    Ok(items
        .iter()
        .filter_map(LooseProduct::from_value)
        .map(|loose| Product {
            id: ProductId::new(),
            name: loose.name,
            price: loose.price,
            category: loose.category,
            img: loose.img,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::MemorySnapshot;
    use crate::models::ImagePath;
    use crate::remote::MemoryContentStore;

    const CATALOG_PATH: &str = "data/products.json";

    fn catalog_with(products: &[(&str, f64, &str, &str)]) -> CatalogStore<MemorySnapshot> {
        let mut catalog = CatalogStore::load(MemorySnapshot::new());
        for (name, price, category, img) in products {
            catalog
                .upsert_by_identity(name, *price, category, ImagePath::parse(img))
                .unwrap();
        }
        catalog
    }

    fn upload(name: &str) -> UploadFile {
        UploadFile::from_bytes(name, name.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn publish_then_fetch_round_trips_published_fields_with_new_ids() {
        let remote = MemoryContentStore::new();
        let client = SyncClient::new(remote.clone());
        let source = catalog_with(&[
            ("Kopi", 5000.0, "minuman", "kopi.jpg"),
            ("Gula", 12000.0, "dapur", "stok/gula.png"),
        ]);

        client
            .publish_catalog(source.products(), CATALOG_PATH)
            .await
            .unwrap();
        let published = String::from_utf8(remote.contents(CATALOG_PATH).unwrap().unwrap()).unwrap();
        assert!(!published.contains("\"id\""));

        let mut target = catalog_with(&[("Lama", 1.0, "", "")]);
        let count = client.fetch_catalog(CATALOG_PATH, &mut target).await.unwrap();
        assert_eq!(count, 2);

        let fetched: Vec<_> = target.products().iter().map(Product::to_published).collect();
        let expected: Vec<_> = source.products().iter().map(Product::to_published).collect();
        assert_eq!(fetched, expected);
        for (fetched, original) in target.products().iter().zip(source.products()) {
            assert_ne!(fetched.id, original.id);
        }
    }

    #[tokio::test]
    async fn publish_updates_existing_document_at_its_revision() {
        let remote = MemoryContentStore::new();
        remote.insert(CATALOG_PATH, b"[]".to_vec()).unwrap();
        let client = SyncClient::new(remote.clone());
        let catalog = catalog_with(&[("Kopi", 5000.0, "minuman", "kopi.jpg")]);

        client
            .publish_catalog(catalog.products(), CATALOG_PATH)
            .await
            .unwrap();
        let published = remote.contents(CATALOG_PATH).unwrap().unwrap();
        assert!(String::from_utf8(published).unwrap().contains("Kopi"));
    }

    #[tokio::test]
    async fn fetch_rejects_non_array_and_keeps_local_catalog() {
        let remote = MemoryContentStore::new();
        remote.insert(CATALOG_PATH, br#"{"name":"x"}"#.to_vec()).unwrap();
        let client = SyncClient::new(remote);
        let mut catalog = catalog_with(&[("Kopi", 5000.0, "minuman", "kopi.jpg")]);

        let error = client
            .fetch_catalog(CATALOG_PATH, &mut catalog)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Format(_)));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn parse_remote_catalog_defaults_missing_fields() {
        let products = parse_remote_catalog(br#"[{"name":"Teh"}, 5, {"price": 2}]"#).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Teh");
        assert_eq!(products[0].price, 0.0);
        assert_eq!(products[1].name, "");
        assert_eq!(products[1].category, "");
    }

    #[tokio::test]
    async fn upload_batch_isolates_a_failing_item() {
        let remote = MemoryContentStore::new();
        remote.fail_path("images/c.jpg", 500).unwrap();
        let client = SyncClient::new(remote.clone());
        let files: Vec<UploadFile> = ["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]
            .into_iter()
            .map(upload)
            .collect();

        let mut seen = Vec::new();
        let report = client
            .upload_files_sequentially(&files, "images", false, |progress| {
                seen.push((progress.completed, progress.total, progress.succeeded));
            })
            .await;

        assert_eq!(report.attempted, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "images/c.jpg");
        assert_eq!(
            seen,
            vec![
                (1, 5, true),
                (2, 5, true),
                (3, 5, false),
                (4, 5, true),
                (5, 5, true),
            ]
        );
        assert_eq!(
            remote.write_log().unwrap(),
            vec![
                "images/a.jpg",
                "images/b.jpg",
                "images/d.jpg",
                "images/e.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn upload_sanitizes_names_and_respects_overwrite() {
        let remote = MemoryContentStore::new();
        remote.insert("images/kopi.jpg", b"old".to_vec()).unwrap();
        let client = SyncClient::new(remote.clone());

        let report = client
            .upload_files_sequentially(&[upload("ko:pi.jpg"), upload("???")], "images", false, |_| {})
            .await;
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failures.len(), 2);

        let report = client
            .upload_files_sequentially(&[upload("ko:pi.jpg")], "images", true, |_| {})
            .await;
        assert!(report.is_complete_success());
        assert_eq!(remote.contents("images/kopi.jpg").unwrap().unwrap(), b"ko:pi.jpg");
    }

    #[tokio::test]
    async fn unreadable_file_fails_alone_and_is_read_in_turn() {
        let dir = tempfile::tempdir().unwrap();
        let kopi = dir.path().join("kopi.jpg");
        let teh = dir.path().join("teh.jpg");
        std::fs::write(&kopi, b"kopi-bytes").unwrap();
        std::fs::write(&teh, b"teh-bytes").unwrap();
        let files = vec![
            UploadFile::from_path(&kopi),
            UploadFile::from_path(dir.path().join("hilang.jpg")),
            UploadFile::from_path(&teh),
        ];

        let remote = MemoryContentStore::new();
        let client = SyncClient::new(remote.clone());
        let mut seen = Vec::new();
        let report = client
            .upload_files_sequentially(&files, "images", false, |progress| {
                seen.push((progress.completed, progress.succeeded));
            })
            .await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failures[0].path, "images/hilang.jpg");
        assert!(report.failures[0].message.contains("hilang.jpg"));
        assert_eq!(seen, vec![(1, true), (2, false), (3, true)]);
        assert_eq!(remote.contents("images/teh.jpg").unwrap().unwrap(), b"teh-bytes");
    }

    #[tokio::test]
    async fn large_images_resolve_revision_without_downloading() {
        let remote = MemoryContentStore::new();
        remote.insert("images/foto.jpg", vec![7u8; 64]).unwrap();
        remote.insert("images/lama.jpg", vec![9u8; 64]).unwrap();
        remote.withhold_content("images/foto.jpg").unwrap();
        remote.withhold_content("images/lama.jpg").unwrap();
        let client = SyncClient::new(remote.clone());

        let report = client
            .upload_files_sequentially(&[upload("foto.jpg")], "images", true, |_| {})
            .await;
        assert!(report.is_complete_success());
        assert_eq!(remote.contents("images/foto.jpg").unwrap().unwrap(), b"foto.jpg");

        let report = client
            .delete_files(&["images/lama.jpg".to_string()], |_| {})
            .await;
        assert!(report.is_complete_success());
        assert_eq!(remote.paths().unwrap(), vec!["images/foto.jpg"]);
    }

    #[tokio::test]
    async fn delete_batch_continues_past_missing_paths() {
        let remote = MemoryContentStore::new();
        remote.insert("images/a.jpg", b"a".to_vec()).unwrap();
        remote.insert("images/c.jpg", b"c".to_vec()).unwrap();
        let client = SyncClient::new(remote.clone());

        let paths = vec![
            "images/a.jpg".to_string(),
            "images/b.jpg".to_string(),
            "images/c.jpg".to_string(),
        ];
        let mut last = None;
        let report = client
            .delete_files(&paths, |progress| last = Some(progress.clone()))
            .await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failures[0].path, "images/b.jpg");
        assert_eq!(last.unwrap().completed, 3);
        assert!(remote.paths().unwrap().is_empty());
    }
}
