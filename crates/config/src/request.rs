use crate::policy::{FailurePolicy, NoFilesPolicy};
use std::path::PathBuf;
use uplift_naming::NameTemplate;
use uplift_storage::{CompressionLevel, UploadOptions};

/// Upload semantics shared by every artifact of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    /// Newline-separated search patterns, handed to file discovery as-is.
    pub search_path: String,
    pub no_files_policy: NoFilesPolicy,
    /// Delete an existing artifact of the same name before uploading.
    pub overwrite: bool,
    pub retention_days: Option<u32>,
    pub compression_level: Option<CompressionLevel>,
    pub upload_failure: FailurePolicy,
}
impl UploadRequest {
    /// Store options for this request; keys are only carried when set.
    #[must_use]
    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            retention_days: self.retention_days,
            compression_level: self.compression_level,
        }
    }
}

/// How matched files are grouped into artifacts. Chosen once per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Every matched file goes into one artifact called `name`.
    SingleArtifact { name: String },
    /// One artifact per matched file, named by rendering `template`.
    PerFile { template: NameTemplate },
}

/// Validated configuration for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub request: UploadRequest,
    pub mode: Mode,
    /// Absolute workspace directory, when one was provided.
    pub workspace: Option<PathBuf>,
    pub include_hidden_files: bool,
}
