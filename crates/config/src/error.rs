//! Configuration Error Types
//!
//! Every kind here is fatal and is raised before any store is contacted.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display(
        "Input does not meet YAML 1.2 \"Core Schema\" specification: {key} ({value:?})\n\
         Support boolean input list: `true | True | TRUE | false | False | FALSE`"
    )]
    InvalidBoolean { key: &'static str, value: String },
    #[display("Invalid retention-days: {_0:?}")]
    InvalidRetention(#[error(not(source))] String),
    #[display("Invalid compression-level: {_0:?}. Valid values are 0-9")]
    InvalidCompression(#[error(not(source))] String),
    #[display("Unrecognized if-no-files-found input. Provided: {_0:?}. Available options: warn, error, ignore")]
    UnknownNoFilesPolicy(#[error(not(source))] String),
    #[display("Unrecognized upload-failure input. Provided: {_0:?}. Available options: abort, continue")]
    UnknownFailurePolicy(#[error(not(source))] String),
    #[display("Input required and not supplied: name")]
    MissingName,
    #[display("Input required and not supplied: path")]
    MissingPath,
    #[display("Invalid workspace directory: {_0:?}")]
    InvalidWorkspace(#[error(not(source))] String),
    #[display("configuration file not found: {}", _0.display())]
    MissingConfigFile(#[error(not(source))] PathBuf),
    #[display("could not load inputs")]
    Load,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            _ => false,
        }
    }
}
