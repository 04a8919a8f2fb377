use serde::Serialize;
use utoipa::ToSchema;
use vidvault_core::models::{Media, TvShow};

/// Outcome of appending one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChunkReceipt {
    pub received_bytes: u64,
    /// Size of the partial file after this chunk
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadLimit {
    pub file_count: i64,
    pub limit: i64,
    pub remaining: i64,
}

/// A finalized upload and, for episodes, the show it was filed under
#[derive(Debug, Clone)]
pub struct FinalizedUpload {
    pub media: Media,
    pub show: Option<TvShow>,
}
