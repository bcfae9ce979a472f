//! Storage models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::OffsetDateTime;

/// What a store reports back after a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReceipt {
    pub name: String,
    /// Number of files stored in the artifact.
    pub files: usize,
    /// Bytes written to the store (after compression).
    pub size: u64,
}

/// Metadata stored alongside every artifact by the
/// [`LocalStore`](crate::backend::LocalStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Only set when the upload carried a retention period.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub compression_level: u32,
    pub files: Vec<ManifestEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the upload's root directory.
    pub path: PathBuf,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// BLAKE3 hash of the uncompressed content.
    pub blake3: String,
}
