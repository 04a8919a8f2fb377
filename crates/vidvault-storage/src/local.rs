use crate::range::{parse_range_header, RangeRequest};
use crate::session::UploadSession;
use crate::stream::{chunked_file_stream, MediaBody};
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path` (e.g. "uploads"),
    /// creating the directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Keys must be relative and may not contain `..` components that could
    /// escape the base storage directory. Dots inside a name (`Heat..1995.mkv`)
    /// are fine.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let escapes = Path::new(storage_key).components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if storage_key.is_empty() || escapes {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        } else if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// `name.ext` -> `name-1a2b3c4d.ext`
    fn disambiguate(filename: &str) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        let suffix = &suffix[..8];
        match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, suffix, ext),
            _ => format!("{}-{}", filename, suffix),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn append_chunk(
        &self,
        session: &UploadSession,
        data: &[u8],
        expected_offset: Option<u64>,
    ) -> StorageResult<u64> {
        let key = session.part_key();
        let path = self.key_to_path(&key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to open partial file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let current_size = file.metadata().await?.len();
        if let Some(expected) = expected_offset {
            if expected != current_size {
                return Err(StorageError::OffsetMismatch {
                    expected: current_size,
                    received: expected,
                });
            }
        }

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write chunk {}: {}", path.display(), e))
        })?;
        file.flush().await?;

        let total = current_size + data.len() as u64;

        tracing::debug!(
            key = %key,
            chunk_bytes = data.len(),
            total_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Appended upload chunk"
        );

        Ok(total)
    }

    async fn session_exists(&self, session: &UploadSession) -> StorageResult<bool> {
        self.exists(&session.part_key()).await
    }

    async fn discard_session(&self, session: &UploadSession) -> StorageResult<()> {
        self.delete(&session.part_key()).await
    }

    async fn reserve_final_key(&self, session: &UploadSession) -> StorageResult<String> {
        let preferred = session.final_key();
        self.ensure_parent_dir(&self.key_to_path(&preferred)?).await?;
        if !self.exists(&preferred).await? {
            return Ok(preferred);
        }

        let key = format!(
            "{}/{}",
            session.owner_id(),
            Self::disambiguate(session.filename())
        );
        tracing::debug!(preferred = %preferred, key = %key, "Final key taken, using a suffixed name");
        Ok(key)
    }

    fn local_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        self.key_to_path(storage_key)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn open_range(
        &self,
        storage_key: &str,
        range_header: Option<&str>,
        chunk_size: usize,
    ) -> StorageResult<MediaBody> {
        let path = self.key_to_path(storage_key)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let file_size = file.metadata().await?.len();

        let (range, start, length) = match parse_range_header(range_header, file_size) {
            RangeRequest::Full => (None, 0, file_size),
            RangeRequest::Partial(range) => (Some(range), range.start, range.len()),
            RangeRequest::Unsatisfiable => {
                return Err(StorageError::RangeNotSatisfiable { file_size });
            }
        };

        let stream = chunked_file_stream(file, start, length, chunk_size).await?;

        tracing::debug!(
            key = %storage_key,
            file_size,
            range_start = start,
            content_length = length,
            partial = range.is_some(),
            "Opened media for streaming"
        );

        Ok(MediaBody {
            file_size,
            range,
            stream,
        })
    }
}
