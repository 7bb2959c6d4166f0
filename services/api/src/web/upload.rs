//! services/api/src/web/upload.rs
//!
//! Single-file upload endpoint. Files land in the upload directory under a
//! collision-resistant generated name and are served back under /uploads.
//!
//! Policy: only image extensions are accepted (the editor uploads inline
//! images and nothing else), and the router-wide body limit caps the size.

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{ApiFailure, ErrorBody};
use crate::web::state::AppState;

/// Extensions the upload endpoint accepts.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    /// Public URL the stored file is served from.
    pub url: String,
}

/// Picks the stored extension from the client-supplied filename, falling
/// back to `.png` when there is none.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_string())
}

/// POST /api/upload - Store one file from a multipart body and return its
/// public URL.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "A single `file` part."),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file, or disallowed type", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiFailure::bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|e| {
                ApiFailure::bad_request(format!("Failed to read file bytes: {}", e))
            })?;
            file = Some((name, data));
            break;
        }
    }

    let (original_name, data) = file.ok_or_else(|| ApiFailure::bad_request("No file provided"))?;

    let ext = extension_of(&original_name);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiFailure::bad_request("File type not allowed"));
    }

    // Timestamp plus a short random suffix keeps names unique without
    // coordinating anything.
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
    let filename = format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, ext);

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| {
            error!("Failed to create upload directory: {:?}", e);
            ApiFailure::Internal("Failed to store file".to_string())
        })?;

    let filepath = state.config.upload_dir.join(&filename);
    tokio::fs::write(&filepath, &data).await.map_err(|e| {
        error!("Failed to write uploaded file: {:?}", e);
        ApiFailure::Internal("Failed to store file".to_string())
    })?;

    Ok(Json(UploadResponse {
        url: format!("/uploads/{}", filename),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_comes_from_the_filename() {
        assert_eq!(extension_of("photo.JPG"), "jpg");
        assert_eq!(extension_of("diagram.svg"), "svg");
    }

    #[test]
    fn missing_extension_defaults_to_png() {
        assert_eq!(extension_of("pasted-image"), "png");
        assert_eq!(extension_of(""), "png");
    }
}
