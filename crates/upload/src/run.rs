use crate::delete::delete_if_exists;
use crate::error::{ErrorKind, Result};
use crate::report::{Report, UploadOutcome, UploadResult, Verdict};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tracing::instrument;
use uplift_config::{FailurePolicy, Mode, NoFilesPolicy, UploadRequest};
use uplift_naming::{AssignedNames, NameTemplate, PathFields};
use uplift_storage::{StoreHandle, UploadOptions};

/// The directory per-file names are derived relative to: the workspace
/// when known, otherwise the parent of the discovered root directory.
pub fn effective_root(root_directory: &Path, workspace: Option<&Path>) -> PathBuf {
    match workspace {
        Some(workspace) => workspace.to_path_buf(),
        None => root_directory.parent().unwrap_or(root_directory).to_path_buf(),
    }
}

/// Drives uploads (and deletions, when overwriting) against one store.
///
/// Every store call is awaited before the next one is issued.
pub struct Uploader {
    store: StoreHandle,
}
impl Uploader {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Upload `files` according to `mode`.
    ///
    /// Returns an error only for a failed upload in single-artifact mode, or
    /// in per-file mode under [`FailurePolicy::Abort`], where the error names
    /// the failed file and the artifacts already uploaded. Everything else,
    /// including matching no files under [`NoFilesPolicy::Error`], is
    /// described by the returned [`Report`].
    #[instrument(skip_all, fields(store = self.store.name(), files = files.len()))]
    pub async fn run(
        &self,
        request: &UploadRequest,
        mode: &Mode,
        files: &[PathBuf],
        root_directory: &Path,
        workspace: Option<&Path>,
    ) -> Result<Report> {
        if files.is_empty() {
            return Ok(no_files(request));
        }
        let s = if files.len() == 1 { "" } else { "s" };
        tracing::info!("With the provided path, there will be {} file{s} uploaded", files.len());
        tracing::info!("Root artifact directory is {}", root_directory.display());

        let options = request.upload_options();
        let report = match mode {
            Mode::SingleArtifact { name } => {
                self.upload_single(request, name, files, root_directory, &options).await?
            },
            Mode::PerFile { template } => {
                let root = effective_root(root_directory, workspace);
                tracing::info!(root = %root.display(), workspace = workspace.is_some(), "Artifact names are relative to {}", root.display());
                self.upload_per_file(request, template, files, root_directory, &root, &options).await?
            },
        };
        report.log_summary();
        Ok(report)
    }

    async fn upload_single(
        &self,
        request: &UploadRequest,
        name: &str,
        files: &[PathBuf],
        root_directory: &Path,
        options: &UploadOptions,
    ) -> Result<Report> {
        if request.overwrite {
            delete_if_exists(self.store.as_ref(), name).await;
        }
        let receipt = self
            .store
            .upload(name, files, root_directory, options)
            .await
            .or_raise(|| ErrorKind::Upload { name: name.to_string() })?;
        tracing::debug!(%name, files = receipt.files, size = receipt.size, "Stored artifact");
        Ok(Report::new(vec![UploadOutcome {
            name: name.to_string(),
            files: files.to_vec(),
            result: UploadResult::Uploaded { size: receipt.size },
        }]))
    }

    async fn upload_per_file(
        &self,
        request: &UploadRequest,
        template: &NameTemplate,
        files: &[PathBuf],
        root_directory: &Path,
        naming_root: &Path,
        options: &UploadOptions,
    ) -> Result<Report> {
        let mut assigned = AssignedNames::new();
        let mut outcomes = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let fields = PathFields::derive(file, naming_root);
            tracing::debug!(file = %file.display(), root = %fields.root, dir = %fields.dir, "Deriving artifact name");
            let name = assigned.resolve(template.render(&fields), index);

            if request.overwrite {
                delete_if_exists(self.store.as_ref(), &name).await;
            }
            // The root directory stays the same for every file so each
            // artifact keeps the file's full relative path.
            let uploaded = self.store.upload(&name, std::slice::from_ref(file), root_directory, options).await;
            assigned.insert(name.clone());

            let result = match uploaded {
                Ok(receipt) => {
                    tracing::debug!(%name, files = receipt.files, size = receipt.size, "Stored artifact");
                    UploadResult::Uploaded { size: receipt.size }
                },
                Err(e) => {
                    tracing::error!(%name, file = %file.display(), error = ?e, "Failed to upload artifact");
                    match request.upload_failure {
                        FailurePolicy::Abort => {
                            outcomes.push(UploadOutcome {
                                name: name.clone(),
                                files: vec![file.clone()],
                                result: UploadResult::Failed(e.to_string()),
                            });
                            // Artifacts stored before the failure stay in the store.
                            let report = Report::new(outcomes);
                            report.log_summary();
                            let uploaded = report.uploaded().map(str::to_string).collect();
                            return Err(e).or_raise(|| ErrorKind::Aborted {
                                name,
                                file: file.clone(),
                                uploaded,
                            });
                        },
                        FailurePolicy::Continue => UploadResult::Failed(e.to_string()),
                    }
                },
            };
            outcomes.push(UploadOutcome {
                name,
                files: vec![file.clone()],
                result,
            });
        }
        Ok(Report::new(outcomes))
    }
}

fn no_files(request: &UploadRequest) -> Report {
    let message = format!(
        "No files were found with the provided path: {}. No artifacts will be uploaded.",
        request.search_path
    );
    match request.no_files_policy {
        NoFilesPolicy::Warn => {
            tracing::warn!("{message}");
            Report::empty(Verdict::Succeeded)
        },
        NoFilesPolicy::Error => Report::empty(Verdict::Failed(message)),
        NoFilesPolicy::Ignore => {
            tracing::info!("{message}");
            Report::empty(Verdict::Succeeded)
        },
    }
}
