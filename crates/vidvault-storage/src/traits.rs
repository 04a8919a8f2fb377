//! Storage abstraction trait
//!
//! This module defines the Storage trait the upload assembler and the stream
//! responder work against.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

use crate::session::UploadSession;
use crate::stream::MediaBody;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Chunk offset mismatch: expected {expected}, got {received}")]
    OffsetMismatch { expected: u64, received: u64 },

    #[error("Range not satisfiable for file of {file_size} bytes")]
    RangeNotSatisfiable { file_size: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Lazily produced file contents
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// **Key format:** keys are owner-scoped and relative to the storage root:
/// `{owner_id}/{filename}` for media and
/// `{owner_id}/{upload_id}_{filename}.part` for in-flight uploads.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Append `data` at the end of the session's partial file, creating it on
    /// the first chunk. When `expected_offset` is given it must equal the
    /// current partial size. Returns the new partial size.
    async fn append_chunk(
        &self,
        session: &UploadSession,
        data: &[u8],
        expected_offset: Option<u64>,
    ) -> StorageResult<u64>;

    /// Whether the session's partial file exists
    async fn session_exists(&self, session: &UploadSession) -> StorageResult<bool>;

    /// Remove the session's partial file; a missing file is not an error
    async fn discard_session(&self, session: &UploadSession) -> StorageResult<()>;

    /// Pick a key for the session's final file that no existing file uses
    async fn reserve_final_key(&self, session: &UploadSession) -> StorageResult<String>;

    /// Filesystem path of a key, for external tools
    fn local_path(&self, storage_key: &str) -> StorageResult<PathBuf>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Remove a file; a missing file is not an error
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Open a file for streaming, honoring an optional `Range` header value.
    async fn open_range(
        &self,
        storage_key: &str,
        range_header: Option<&str>,
        chunk_size: usize,
    ) -> StorageResult<MediaBody>;
}
