//! Upload helpers for integration tests.

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use serde_json::json;
use uuid::Uuid;

use super::auth::TestUser;

pub const MIB: usize = 1024 * 1024;

/// Deterministic non-repeating-looking payload of `len` bytes
pub fn video_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 251) % 256) as u8).collect()
}

/// POST one chunk to `/upload_chunk`
pub async fn send_chunk(
    client: &TestServer,
    user: &TestUser,
    upload_id: &str,
    filename: &str,
    chunk: &[u8],
    offset: Option<u64>,
) -> TestResponse {
    let part = Part::bytes(bytes::Bytes::from(chunk.to_vec()))
        .file_name("blob")
        .mime_type("application/octet-stream");
    let mut form = MultipartForm::new()
        .add_text("uploadId", upload_id)
        .add_text("originalFilename", filename)
        .add_part("file", part);
    if let Some(offset) = offset {
        form = form.add_text("offset", offset.to_string());
    }

    client
        .post("/upload_chunk")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await
}

pub async fn finalize(
    client: &TestServer,
    user: &TestUser,
    upload_id: &str,
    filename: &str,
) -> TestResponse {
    client
        .post("/finalize_upload")
        .add_header("Authorization", user.bearer())
        .json(&json!({ "uploadId": upload_id, "originalFilename": filename }))
        .await
}

/// Send `data` in `chunk_size` pieces with offsets, then finalize.
pub async fn upload_file(
    client: &TestServer,
    user: &TestUser,
    filename: &str,
    data: &[u8],
    chunk_size: usize,
) -> TestResponse {
    let upload_id = Uuid::new_v4().to_string();
    let mut offset = 0u64;
    for chunk in data.chunks(chunk_size) {
        let response = send_chunk(client, user, &upload_id, filename, chunk, Some(offset)).await;
        assert_eq!(response.status_code(), 200, "{}", response.text());
        offset += chunk.len() as u64;
    }
    finalize(client, user, &upload_id, filename).await
}

/// Upload and finalize, returning the new media id
pub async fn upload_media(
    client: &TestServer,
    user: &TestUser,
    filename: &str,
    data: &[u8],
) -> Uuid {
    let response = upload_file(client, user, filename, data, MIB).await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let body: serde_json::Value = response.json();
    Uuid::parse_str(body["id"].as_str().expect("Expected 'id' in finalize response"))
        .expect("Invalid UUID in finalize response")
}
