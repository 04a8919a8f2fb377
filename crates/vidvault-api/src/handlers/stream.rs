use crate::auth::models::UserContext;
use crate::constants::VIDEO_CONTENT_TYPE;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::access::owned_media;
use crate::state::{DbState, MediaConfig};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use futures::StreamExt;
use uuid::Uuid;
use vidvault_core::models::{MediaFile, MediaKind};
use vidvault_core::AppError;

#[utoipa::path(
    get,
    path = "/stream/{type}/{id}",
    tag = "streaming",
    params(
        ("type" = MediaKind, Path, description = "Media type (movie or episode)"),
        ("id" = Uuid, Path, description = "Media ID"),
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. bytes=0-1023")
    ),
    responses(
        (status = 200, description = "Whole file", content_type = "video/mp4"),
        (status = 206, description = "Requested byte range", content_type = "video/mp4"),
        (status = 403, description = "Media belongs to another user", body = ErrorResponse),
        (status = 404, description = "Media or file not found", body = ErrorResponse),
        (status = 416, description = "Range outside the file", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(db, media_config, headers),
    fields(user_id = %user.user_id, media_type = %media_type, media_id = %id)
)]
pub async fn stream_media(
    user: UserContext,
    Path((media_type, id)): Path<(String, Uuid)>,
    State(db): State<DbState>,
    State(media_config): State<MediaConfig>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let kind: MediaKind = media_type.parse()?;
    let media = owned_media(&db, kind, id, user.user_id).await?;

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    let body = media_config
        .storage
        .open_range(
            media.storage_path(),
            range_header,
            media_config.stream_chunk_size,
        )
        .await?;

    let content_length = body.content_length();
    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, content_length);

    builder = match body.range {
        Some(range) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, range.content_range(body.file_size)),
        None => builder.status(StatusCode::OK),
    };

    // Wrap storage stream for axum Body
    let body_stream = body.stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    builder.body(Body::from_stream(body_stream)).map_err(|e| {
        HttpAppError(AppError::Internal(format!(
            "Failed to build stream response: {}",
            e
        )))
    })
}
