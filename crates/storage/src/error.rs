//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Artifact does not exist
    #[display("artifact not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Artifact already exists and the store will not replace it
    #[display("artifact already exists: {_0}")]
    AlreadyExists(#[error(not(source))] String),
    /// Artifact name contains characters the store cannot hold
    #[display("invalid artifact name: {_0:?}")]
    InvalidName(#[error(not(source))] String),
    /// Compression level outside of the supported range
    #[display("invalid compression level: {_0}")]
    InvalidCompressionLevel(#[error(not(source))] String),
    /// File is not below the upload's root directory
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Access denied (permissions or credentials)
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Stored artifact metadata could not be read or written
    #[display("invalid artifact manifest")]
    Manifest,
    /// Backend-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::BackendError(_))
    }

    /// Returns `true` for the benign "nothing to delete" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
