pub mod storage;

pub use storage::{BlobStore, BoxReader, FilesystemBlobStore, StorageError};
