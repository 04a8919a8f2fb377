//! Chunked upload endpoints
//!
//! Clients split a file into chunks and POST them in order to `/upload_chunk`
//! under a self-chosen `uploadId`, then call `/finalize_upload` once.

use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::upload::{ChunkReceipt, FinalizedUpload, UploadLimit, UploadService};
use crate::state::MediaConfig;
use crate::utils::multipart::{extract_chunk_form, ChunkForm};
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vidvault_core::models::{MediaFile, MediaKind};
use vidvault_core::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FinalizeUploadRequest {
    #[serde(rename = "uploadId")]
    pub upload_id: String,
    #[serde(rename = "originalFilename")]
    pub original_filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FinalizeUploadResponse {
    pub success: bool,
    pub media_type: MediaKind,
    pub id: Uuid,
    pub title: String,
    pub duration: f64,
    /// Set for episodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_title: Option<String>,
}

/// Multipart form of `/upload_chunk`, for the OpenAPI document only
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadChunkForm {
    #[schema(format = Binary, value_type = String)]
    pub file: Vec<u8>,
    #[serde(rename = "uploadId")]
    pub upload_id: String,
    #[serde(rename = "originalFilename")]
    pub original_filename: String,
    /// Bytes already sent; when present it must match what the server holds
    pub offset: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/check_upload_limit",
    tag = "uploads",
    responses(
        (status = 200, description = "Current usage against the file limit", body = UploadLimit),
        (status = 403, description = "File limit reached", body = ErrorResponse)
    )
)]
pub async fn check_upload_limit(
    user: UserContext,
    State(upload): State<UploadService>,
) -> Result<Json<UploadLimit>, HttpAppError> {
    Ok(Json(upload.check_upload_limit(user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/upload_chunk",
    tag = "uploads",
    request_body(content = UploadChunkForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Chunk appended", body = ChunkReceipt),
        (status = 400, description = "Malformed form", body = ErrorResponse),
        (status = 409, description = "Offset does not match the bytes received so far", body = ErrorResponse),
        (status = 413, description = "Chunk larger than the configured maximum", body = ErrorResponse),
        (status = 500, description = "Write failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(upload, media_config, multipart), fields(user_id = %user.user_id))]
pub async fn upload_chunk(
    user: UserContext,
    State(upload): State<UploadService>,
    State(media_config): State<MediaConfig>,
    multipart: Multipart,
) -> Result<Json<ChunkReceipt>, HttpAppError> {
    let ChunkForm {
        data,
        upload_id,
        original_filename,
        offset,
    } = extract_chunk_form(multipart, media_config.max_chunk_size).await?;

    let receipt = upload
        .append_chunk(user.user_id, &upload_id, &original_filename, &data, offset)
        .await?;

    Ok(Json(receipt))
}

#[utoipa::path(
    post,
    path = "/finalize_upload",
    tag = "uploads",
    request_body = FinalizeUploadRequest,
    responses(
        (status = 200, description = "Upload added to the library", body = FinalizeUploadResponse),
        (status = 403, description = "File limit reached", body = ErrorResponse),
        (status = 404, description = "Unknown upload session or unresolvable show", body = ErrorResponse),
        (status = 500, description = "Remux failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(upload, request), fields(user_id = %user.user_id, upload_id = %request.upload_id))]
pub async fn finalize_upload(
    user: UserContext,
    State(upload): State<UploadService>,
    ValidatedJson(request): ValidatedJson<FinalizeUploadRequest>,
) -> Result<Json<FinalizeUploadResponse>, HttpAppError> {
    if request.upload_id.trim().is_empty() || request.original_filename.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "uploadId and originalFilename are required".to_string(),
        )
        .into());
    }

    let FinalizedUpload { media, show } = upload
        .finalize(user.user_id, &request.upload_id, &request.original_filename)
        .await?;

    Ok(Json(FinalizeUploadResponse {
        success: true,
        media_type: media.kind(),
        id: media.id(),
        title: media.title().to_string(),
        duration: media.duration(),
        show_id: show.as_ref().map(|s| s.id),
        show_title: show.map(|s| s.title),
    }))
}
