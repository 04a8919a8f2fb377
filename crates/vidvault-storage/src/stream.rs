use futures::StreamExt;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::range::ByteRange;
use crate::traits::{ByteStream, StorageError, StorageResult};

/// Default read size for streamed bodies (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// A file opened for streaming, possibly restricted to a byte range
pub struct MediaBody {
    pub file_size: u64,
    /// `None` when the whole file is served
    pub range: Option<ByteRange>,
    pub stream: ByteStream,
}

impl MediaBody {
    /// Bytes the body will carry, barring truncation of the file mid-stream
    pub fn content_length(&self) -> u64 {
        self.range.map_or(self.file_size, |range| range.len())
    }
}

/// Stream `length` bytes of `file` starting at `start`, `chunk_size` bytes at a time.
///
/// The sequence is forward-only and pull-driven: nothing is read until the
/// consumer polls, and dropping it closes the file. It ends early, without
/// an error, if the file is shorter than expected.
pub async fn chunked_file_stream(
    mut file: File,
    start: u64,
    length: u64,
    chunk_size: usize,
) -> StorageResult<ByteStream> {
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    let reader = ReaderStream::with_capacity(file.take(length), chunk_size.max(1));
    let stream = reader.map(|result| {
        result.map_err(|e| StorageError::DownloadFailed(format!("Failed to read chunk: {}", e)))
    });

    Ok(Box::pin(stream))
}
