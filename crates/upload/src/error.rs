//! Upload Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An upload error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for upload operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The store rejected or failed an upload; the cause is the storage error.
    #[display("failed to upload artifact {name:?}")]
    Upload { name: String },
    /// A per-file upload failed under the `abort` policy. `uploaded` lists
    /// the artifacts stored earlier in the run, in upload order.
    #[display(
        "failed to upload {} as artifact {name:?}, aborting after {} uploaded artifact(s)",
        file.display(),
        uploaded.len()
    )]
    Aborted {
        name: String,
        file: PathBuf,
        uploaded: Vec<String>,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upload { .. } | Self::Aborted { .. } => false,
        }
    }
}
