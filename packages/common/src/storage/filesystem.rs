use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::traits::{BlobStore, BoxReader};

/// Filesystem-backed path-addressed blob store.
///
/// Blobs live under `{base_path}/{category}/{uuid}.{extension}`; the
/// relative `{category}/{uuid}.{extension}` part is what callers persist
/// and later pass back for reads and deletes.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store rooted at `base_path`.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Resolve a relative blob path to an absolute filesystem path.
    ///
    /// Rejects anything that could escape the store root: empty paths,
    /// absolute paths, backslashes, and `.`/`..` components.
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        if relative.is_empty() {
            return Err(StorageError::InvalidPath("path is empty".into()));
        }
        if relative.starts_with('/') || relative.contains('\\') {
            return Err(StorageError::InvalidPath(relative.into()));
        }
        if relative
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(StorageError::InvalidPath(relative.into()));
        }
        Ok(self.base_path.join(relative))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

/// A single path segment usable as a category or file extension: non-empty
/// ASCII alphanumerics (extensions like `png`, categories like `photos`).
fn validate_segment(segment: &str, what: &str) -> Result<(), StorageError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(StorageError::InvalidPath(format!(
            "{what} must be ASCII alphanumeric, got {segment:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(
        &self,
        data: &[u8],
        category: &str,
        extension: &str,
    ) -> Result<String, StorageError> {
        validate_segment(category, "category")?;
        validate_segment(extension, "extension")?;

        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let relative = format!("{category}/{}.{extension}", uuid::Uuid::new_v4());
        let blob_path = self.base_path.join(&relative);

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(relative)
    }

    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError> {
        let blob_path = self.resolve(path)?;
        match fs::File::open(&blob_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let blob_path = self.resolve(path)?;
        Ok(fs::try_exists(&blob_path).await?)
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let blob_path = self.resolve(path)?;
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let blob_path = self.resolve(path)?;
        match fs::metadata(&blob_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
