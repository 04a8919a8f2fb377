//! Multipart form extraction

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use vidvault_core::AppError;

pub struct ChunkForm {
    pub data: Bytes,
    pub upload_id: String,
    pub original_filename: String,
    pub offset: Option<u64>,
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing required field: {}", name)))
}

/// Body limit hits become 413, anything else is a malformed request
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::BadRequest(format!("{}: {}", context, err.body_text()))
    }
}

/// Validate chunk size
pub fn validate_chunk_size(chunk_size: usize, max_size: usize) -> Result<(), AppError> {
    if chunk_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "Chunk of {} bytes exceeds the maximum of {} bytes",
            chunk_size, max_size
        )));
    }
    Ok(())
}

/// Read the chunk form; fields may arrive in any order.
pub async fn extract_chunk_form(
    mut multipart: Multipart,
    max_chunk_size: usize,
) -> Result<ChunkForm, AppError> {
    let mut data = None;
    let mut upload_id = None;
    let mut original_filename = None;
    let mut offset = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;
                validate_chunk_size(bytes.len(), max_chunk_size)?;
                data = Some(bytes);
            }
            "uploadId" | "originalFilename" | "offset" => {
                let value = field.text().await.map_err(|e| {
                    multipart_error(&format!("Failed to read field {}", name), e)
                })?;
                match name.as_str() {
                    "uploadId" => upload_id = Some(value),
                    "originalFilename" => original_filename = Some(value),
                    _ => offset = Some(value),
                }
            }
            _ => {}
        }
    }

    let offset = match offset.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(value.parse::<u64>().map_err(|_| {
            AppError::InvalidInput(format!("Invalid offset: {}", value))
        })?),
    };

    Ok(ChunkForm {
        data: data.ok_or_else(|| {
            AppError::InvalidInput("Missing required field: file".to_string())
        })?,
        upload_id: required(upload_id, "uploadId")?,
        original_filename: required(original_filename, "originalFilename")?,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidvault_core::ErrorMetadata;

    #[test]
    fn test_validate_chunk_size() {
        assert!(validate_chunk_size(1024, 1024).is_ok());

        let err = validate_chunk_size(1025, 1024).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
    }
}
