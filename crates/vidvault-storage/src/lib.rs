//! Vidvault Storage Library
//!
//! Filesystem storage for uploaded media: chunked upload assembly into
//! partial files and range-aware, lazily read file streams.
//!
//! # Storage key format
//!
//! Keys are owner-scoped and relative to the upload folder:
//!
//! - **Finalized media**: `{owner_id}/{filename}`
//! - **In-flight uploads**: `{owner_id}/{upload_id}_{filename}.part`
//!
//! Keys must not contain `..` or a leading `/`. Filenames and upload ids are
//! sanitized in [`session::UploadSession`] before any key is built.

pub mod local;
pub mod range;
pub mod session;
pub mod stream;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use range::{parse_range_header, ByteRange, RangeRequest};
pub use session::UploadSession;
pub use stream::{MediaBody, DEFAULT_CHUNK_SIZE};
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
