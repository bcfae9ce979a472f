//! Artifact storage for uplift.
//!
//! The [`ArtifactStore`] trait is the only seam the upload orchestrator
//! talks to: one call to upload a named artifact made of files below a root
//! directory, and one call to delete an artifact by name. Implementations
//! decide how (and where) artifacts are kept.

pub mod backend;
pub mod error;
mod models;
mod name;
mod options;

pub use crate::backend::ArtifactStore;
pub use crate::models::{Manifest, ManifestEntry, UploadReceipt};
pub use crate::name::validate as validate_name;
pub use crate::options::{CompressionLevel, DEFAULT_COMPRESSION_LEVEL, UploadOptions};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn ArtifactStore + Send + Sync>;
