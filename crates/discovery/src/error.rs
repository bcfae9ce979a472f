//! Discovery Error Types

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A discovery error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Search path line that cannot be understood
    #[display("invalid search pattern: {_0:?}")]
    InvalidPattern(#[error(not(source))] String),
    /// Directory or file that cannot be read
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    pub(crate) fn from_io(err: IoError, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }
}
