use uplift_storage::ArtifactStore;

/// What happened to an artifact before it was replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// There was nothing to delete.
    NotFound,
    /// Deleting failed; the error was logged and swallowed.
    Failed,
}

/// Delete the artifact called `name`, if there is one.
///
/// Never fails: a missing artifact is logged at debug level, any other
/// error at warning level, and the caller carries on with the upload.
pub async fn delete_if_exists(store: &dyn ArtifactStore, name: &str) -> Deletion {
    match store.delete(name).await {
        Ok(()) => {
            tracing::info!(%name, "Deleted existing artifact");
            Deletion::Deleted
        },
        Err(e) if e.is_not_found() => {
            tracing::debug!(%name, "Skipping deletion of '{name}', it does not exist");
            Deletion::NotFound
        },
        Err(e) => {
            tracing::warn!(%name, error = ?e, "Unable to delete artifact: {e}");
            Deletion::Failed
        },
    }
}
