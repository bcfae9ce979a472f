//! Run policies selected by name.

use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::str::FromStr;

/// What to do when the search path matches no files.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum NoFilesPolicy {
    /// Log a warning, the run still succeeds.
    #[default]
    #[display("warn")]
    Warn,
    /// Fail the run (without uploading anything).
    #[display("error")]
    Error,
    /// Log an informational message, the run succeeds.
    #[display("ignore")]
    Ignore,
}
impl FromStr for NoFilesPolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "ignore" => Ok(Self::Ignore),
            other => exn::bail!(ErrorKind::UnknownNoFilesPolicy(other.to_string())),
        }
    }
}

/// What the per-file loop does after one artifact fails to upload.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failed upload; remaining files are not attempted.
    #[display("abort")]
    Abort,
    /// Record the failure, upload the remaining files, fail the run at the end.
    #[display("continue")]
    Continue,
}
impl Default for FailurePolicy {
    fn default() -> Self {
        DEFAULT_FAILURE_POLICY
    }
}
impl FromStr for FailurePolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => exn::bail!(ErrorKind::UnknownFailurePolicy(other.to_string())),
        }
    }
}

/// Failure policy used when `upload-failure` isn't configured.
pub const DEFAULT_FAILURE_POLICY: FailurePolicy = FailurePolicy::Abort;
