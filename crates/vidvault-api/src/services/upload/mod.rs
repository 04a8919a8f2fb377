//! Chunked upload assembly and finalization

mod locks;
mod service;
mod types;

pub use locks::{KeyedLockGuard, KeyedLocks};
pub use service::UploadService;
pub use types::{ChunkReceipt, FinalizedUpload, UploadLimit};
