use std::path::PathBuf;

/// Result of uploading a single artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadResult {
    Uploaded { size: u64 },
    Failed(String),
}

/// One artifact of a run and the files it was made of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub name: String,
    pub files: Vec<PathBuf>,
    pub result: UploadResult,
}
impl UploadOutcome {
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        matches!(self.result, UploadResult::Uploaded { .. })
    }
}

/// Whether the run as a whole succeeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Succeeded,
    /// The run failed without an error being raised (no files matched under
    /// the `error` policy, or some per-file uploads failed).
    Failed(String),
}

/// Everything a run did, for end-of-run reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub outcomes: Vec<UploadOutcome>,
    pub verdict: Verdict,
}
impl Report {
    pub(crate) fn new(outcomes: Vec<UploadOutcome>) -> Self {
        let failed = outcomes.iter().filter(|outcome| !outcome.is_uploaded()).count();
        let verdict = match failed {
            0 => Verdict::Succeeded,
            n => Verdict::Failed(format!("{n} of {} artifact(s) failed to upload", outcomes.len())),
        };
        Self { outcomes, verdict }
    }

    pub(crate) fn empty(verdict: Verdict) -> Self {
        Self {
            outcomes: Vec::new(),
            verdict,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.verdict == Verdict::Succeeded
    }

    /// Names of the artifacts that were uploaded, in upload order.
    pub fn uploaded(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter(|outcome| outcome.is_uploaded()).map(|outcome| outcome.name.as_str())
    }

    pub(crate) fn log_summary(&self) {
        for outcome in &self.outcomes {
            match &outcome.result {
                UploadResult::Uploaded { size } => {
                    tracing::debug!(name = %outcome.name, files = outcome.files.len(), size, "Artifact uploaded");
                },
                UploadResult::Failed(reason) => {
                    tracing::warn!(name = %outcome.name, files = ?outcome.files, "Artifact failed to upload: {reason}");
                },
            }
        }
        tracing::info!("{} artifact(s) uploaded", self.uploaded().count());
    }
}
