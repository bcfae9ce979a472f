//! Local filesystem artifact store.
//!
//! Every artifact is a directory below the store root, named after the
//! artifact. Uploaded files keep their layout relative to the upload's root
//! directory and are gzip-compressed individually (`<path>.gz`). An
//! `artifact.json` [`Manifest`] is written last; a directory without one is
//! not an artifact.

use crate::backend::ArtifactStore;
use crate::error::{ErrorKind, Result};
use crate::models::{Manifest, ManifestEntry, UploadReceipt};
use crate::name::validate as validate_name;
use crate::options::{CompressionLevel, UploadOptions};
use async_trait::async_trait;
use exn::ResultExt;
use flate2::write::GzEncoder;
use std::fs::{self as sync_fs, File, create_dir_all as sync_create_dir};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};
use time::{Duration, OffsetDateTime};
use tokio::fs;

const MANIFEST: &str = "artifact.json";
const COMPRESSED_SUFFIX: &str = ".gz";
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Local filesystem artifact store.
///
/// # Examples
///
/// ```no_run
/// use uplift_storage::backend::LocalStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalStore::new("local", "/var/lib/uplift/artifacts")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalStore {
    name: String,
    /// Directory holding one sub-directory per artifact
    root: PathBuf,
}
impl LocalStore {
    /// Create a new local store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists but isn't a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Use non-async here; it'll only happen once on startup and it's
            // not worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    /// Read back the manifest of a stored artifact.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if there is no such artifact.
    pub async fn manifest(&self, name: &str) -> Result<Manifest> {
        let path = self.artifact_dir(name)?.join(MANIFEST);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => exn::bail!(ErrorKind::NotFound(name.to_string())),
            Err(e) => exn::bail!(Self::map_io_error(e, &path)),
        };
        serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Manifest)
    }

    /// Absolute location of a stored file inside an artifact.
    pub fn stored_path(&self, name: &str, relative: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(compressed_path(&self.artifact_dir(name)?.join(relative)))
    }

    fn artifact_dir(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_name(name)?))
    }

    fn map_io_error(e: io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upload(
        &self,
        name: &str,
        files: &[PathBuf],
        root: &Path,
        options: &UploadOptions,
    ) -> Result<UploadReceipt> {
        let dir = self.artifact_dir(name)?;
        if self.exists(name).await? {
            exn::bail!(ErrorKind::AlreadyExists(name.to_string()));
        }
        // Leftovers from an interrupted upload (no manifest) are not an artifact.
        _ = fs::remove_dir_all(&dir).await;
        let entries = files
            .iter()
            .map(|file| Ok((file.clone(), relative_to(file, root)?)))
            .collect::<Result<Vec<_>>>()?;

        let level = options.compression_level.unwrap_or_default();
        let created_at = OffsetDateTime::now_utc();
        let manifest = Manifest {
            name: name.to_string(),
            created_at,
            expires_at: options.retention_days.map(|days| created_at + Duration::days(i64::from(days))),
            compression_level: level.get(),
            files: Vec::with_capacity(entries.len()),
        };

        let target = dir.clone();
        let written = tokio::task::spawn_blocking(move || write_artifact(&target, manifest, &entries, level))
            .await
            .or_raise(|| ErrorKind::BackendError("upload task did not complete".to_string()))
            .and_then(|result| result);
        match written {
            Ok((manifest, size)) => {
                tracing::debug!(store = %self.name, artifact = name, files = manifest.files.len(), size, "Artifact stored");
                Ok(UploadReceipt {
                    name: manifest.name,
                    files: manifest.files.len(),
                    size,
                })
            },
            Err(e) => {
                // Never leave a half-written artifact behind.
                _ = fs::remove_dir_all(&dir).await;
                Err(e)
            },
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let dir = self.artifact_dir(name)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => exn::bail!(ErrorKind::NotFound(name.to_string())),
            Err(e) => Err(exn::Exn::from(Self::map_io_error(e, &dir))),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let manifest = self.artifact_dir(name)?.join(MANIFEST);
        Ok(fs::try_exists(&manifest).await.map_err(ErrorKind::Io)?)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| Self::map_io_error(e, &self.root))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::map_io_error(e, &self.root))? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if fs::try_exists(entry.path().join(MANIFEST)).await.map_err(ErrorKind::Io)? {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Path of `file` relative to `root`, rejecting anything that isn't strictly
/// below it.
fn relative_to(file: &Path, root: &Path) -> Result<PathBuf> {
    let relative = file.strip_prefix(root).or_raise(|| ErrorKind::InvalidPath(file.to_path_buf()))?;
    let normal = relative.components().all(|c| matches!(c, Component::Normal(_)));
    if !normal || relative.as_os_str().is_empty() {
        exn::bail!(ErrorKind::InvalidPath(file.to_path_buf()));
    }
    Ok(relative.to_path_buf())
}

fn compressed_path(path: &Path) -> PathBuf {
    let mut path = path.as_os_str().to_owned();
    path.push(COMPRESSED_SUFFIX);
    PathBuf::from(path)
}

/// Blocking half of [`LocalStore::upload`]: compresses every file into `dir`
/// and writes the manifest last. Returns the manifest and the bytes written.
fn write_artifact(
    dir: &Path,
    mut manifest: Manifest,
    entries: &[(PathBuf, PathBuf)],
    level: CompressionLevel,
) -> Result<(Manifest, u64)> {
    sync_create_dir(dir).map_err(|e| LocalStore::map_io_error(e, dir))?;
    let mut written = 0;
    let mut buffer = vec![0; COPY_BUFFER_SIZE];
    for (source, relative) in entries {
        let target = compressed_path(&dir.join(relative));
        if let Some(parent) = target.parent() {
            sync_create_dir(parent).map_err(|e| LocalStore::map_io_error(e, parent))?;
        }
        let mut input = File::open(source).map_err(|e| LocalStore::map_io_error(e, source))?;
        let output = File::create(&target).map_err(|e| LocalStore::map_io_error(e, &target))?;
        let mut encoder = GzEncoder::new(BufWriter::new(output), level.into());
        let mut hasher = blake3::Hasher::new();
        let mut size = 0u64;
        loop {
            let read = input.read(&mut buffer).map_err(ErrorKind::Io)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
            encoder.write_all(&buffer[..read]).map_err(ErrorKind::Io)?;
            size += read as u64;
        }
        encoder.finish().and_then(|mut w| w.flush()).map_err(ErrorKind::Io)?;
        written += sync_fs::metadata(&target).map_err(ErrorKind::Io)?.len();
        manifest.files.push(ManifestEntry {
            path: relative.clone(),
            size,
            blake3: hasher.finalize().to_string(),
        });
    }
    let json = serde_json::to_vec_pretty(&manifest).or_raise(|| ErrorKind::Manifest)?;
    let manifest_path = dir.join(MANIFEST);
    sync_fs::write(&manifest_path, &json).map_err(|e| LocalStore::map_io_error(e, &manifest_path))?;
    written += json.len() as u64;
    Ok((manifest, written))
}
