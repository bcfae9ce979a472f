//! Artifact store trait and implementations.
//!
//! This module defines the [`ArtifactStore`] trait, the narrow interface the
//! upload orchestrator depends on, plus a local filesystem implementation and
//! (behind the `mock` feature) an in-memory implementation for tests.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalStore;
#[cfg(feature = "mock")]
pub use self::mock::{MockCall, MockStore};
use crate::error::Result;
use crate::models::UploadReceipt;
use crate::options::UploadOptions;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Unified interface for artifact stores.
///
/// An artifact is a named collection of files. Every file is stored under its
/// path relative to the root directory passed to [`upload()`](Self::upload),
/// so the same file list uploaded with a different root produces a different
/// layout inside the artifact.
///
/// Retries, timeouts and transport concerns belong to implementations; callers
/// treat every method as a single blocking operation.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use uplift_storage::{ArtifactStore, UploadOptions, error::Result};
///
/// async fn replace(store: &dyn ArtifactStore, name: &str, file: PathBuf) -> Result<u64> {
///     if store.exists(name).await? {
///         store.delete(name).await?;
///     }
///     let root = file.parent().unwrap_or(Path::new("/")).to_path_buf();
///     let receipt = store.upload(name, &[file], &root, &UploadOptions::default()).await?;
///     Ok(receipt.size)
/// }
/// ```
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Name of the configured store (used for logging only).
    fn name(&self) -> &str;

    /// Upload `files` as a single artifact called `name`.
    ///
    /// Every file must be located below `root`. Returns
    /// [`InvalidName`](crate::error::ErrorKind::InvalidName) if `name` fails
    /// [`validate_name`](crate::validate_name), and
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if an
    /// artifact with that name is already stored.
    async fn upload(
        &self,
        name: &str,
        files: &[PathBuf],
        root: &Path,
        options: &UploadOptions,
    ) -> Result<UploadReceipt>;

    /// Delete the artifact called `name`.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if there is no
    /// such artifact, so callers can tell "nothing to delete" apart from a
    /// real failure.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Check if an artifact exists.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Names of all stored artifacts, sorted.
    async fn list(&self) -> Result<Vec<String>>;
}
