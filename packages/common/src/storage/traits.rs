use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Path-addressed blob storage.
///
/// Blobs are identified by the relative path returned from [`put`],
/// e.g. `photos/0192f3a1-….png`. The path is opaque to callers beyond
/// being safe to embed in a URL.
///
/// [`put`]: BlobStore::put
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a fresh name in `category`, with the given file
    /// extension, and return the relative path.
    async fn put(&self, data: &[u8], category: &str, extension: &str)
    -> Result<String, StorageError>;

    /// Retrieve all bytes for a blob by its relative path.
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(path).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve a blob as a streaming async reader.
    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete a blob by its relative path.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, path: &str) -> Result<u64, StorageError>;
}
