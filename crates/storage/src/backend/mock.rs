//! In-memory artifact store for testing.

use crate::backend::ArtifactStore;
use crate::error::{ErrorKind, Result};
use crate::models::UploadReceipt;
use crate::name::validate as validate_name;
use crate::options::UploadOptions;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// A call received by a [`MockStore`], recorded in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    Upload {
        name: String,
        files: Vec<PathBuf>,
        root: PathBuf,
        options: UploadOptions,
    },
    Delete(String),
}

/// In-memory artifact store for testing.
///
/// Artifacts are kept in a map behind a [`RwLock`], so all trait methods can
/// operate on `&self`. Every upload and delete is recorded (including the
/// ones that fail) and can be inspected with [`calls()`](Self::calls).
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use uplift_storage::backend::{MockCall, MockStore};
/// use uplift_storage::{ArtifactStore, UploadOptions};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockStore::with_artifacts(["old"]).failing_upload("broken");
/// assert!(store.exists("old").await?);
///
/// let files = [PathBuf::from("/work/a.txt")];
/// store.upload("new", &files, Path::new("/work"), &UploadOptions::default()).await?;
/// assert!(store.upload("broken", &files, Path::new("/work"), &UploadOptions::default()).await.is_err());
/// assert_eq!(store.calls().await.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockStore {
    name: String,
    artifacts: RwLock<BTreeMap<String, Vec<PathBuf>>>,
    calls: RwLock<Vec<MockCall>>,
    failing_uploads: HashSet<String>,
    failing_deletes: bool,
}

impl MockStore {
    /// Create a mock store pre-populated with (empty) artifacts.
    pub fn with_artifacts(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let artifacts = names.into_iter().map(|name| (name.into(), Vec::new())).collect();
        Self {
            name: "mock".to_string(),
            artifacts: RwLock::new(artifacts),
            calls: RwLock::new(Vec::new()),
            failing_uploads: HashSet::new(),
            failing_deletes: false,
        }
    }

    /// Change the name of the mock store.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every upload of `name` fail with a backend error.
    pub fn failing_upload(mut self, name: impl Into<String>) -> Self {
        self.failing_uploads.insert(name.into());
        self
    }

    /// Make every delete fail with an error other than "not found".
    pub fn failing_deletes(mut self) -> Self {
        self.failing_deletes = true;
        self
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.read().await.clone()
    }

    /// Only the upload calls, in order.
    pub async fn uploads(&self) -> Vec<MockCall> {
        self.calls().await.into_iter().filter(|call| matches!(call, MockCall::Upload { .. })).collect()
    }

    /// Files stored under `name`, if the artifact exists.
    pub async fn files(&self, name: &str) -> Option<Vec<PathBuf>> {
        self.artifacts.read().await.get(name).cloned()
    }
}
impl Default for MockStore {
    fn default() -> Self {
        let names: [&str; 0] = [];
        Self::with_artifacts(names)
    }
}

#[async_trait]
impl ArtifactStore for MockStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upload(
        &self,
        name: &str,
        files: &[PathBuf],
        root: &Path,
        options: &UploadOptions,
    ) -> Result<UploadReceipt> {
        self.calls.write().await.push(MockCall::Upload {
            name: name.to_string(),
            files: files.to_vec(),
            root: root.to_path_buf(),
            options: *options,
        });
        validate_name(name)?;
        if self.failing_uploads.contains(name) {
            exn::bail!(ErrorKind::BackendError(format!("upload of {name} rejected")));
        }
        let mut artifacts = self.artifacts.write().await;
        if artifacts.contains_key(name) {
            exn::bail!(ErrorKind::AlreadyExists(name.to_string()));
        }
        if let Some(outside) = files.iter().find(|file| !file.starts_with(root)) {
            exn::bail!(ErrorKind::InvalidPath(outside.clone()));
        }
        artifacts.insert(name.to_string(), files.to_vec());
        Ok(UploadReceipt {
            name: name.to_string(),
            files: files.len(),
            size: 0,
        })
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.calls.write().await.push(MockCall::Delete(name.to_string()));
        if self.failing_deletes {
            exn::bail!(ErrorKind::BackendError(format!("delete of {name} rejected")));
        }
        self.artifacts
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(name.to_string())))
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.artifacts.read().await.contains_key(name))
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.artifacts.read().await.keys().cloned().collect())
    }
}
