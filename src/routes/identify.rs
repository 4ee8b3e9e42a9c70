// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flower identification route.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::MaybeUser;
use crate::models::IdentificationResult;
use crate::services::{normalize_reply, StagedImage};
use crate::AppState;

/// Largest accepted image upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Multipart field holding the image.
const FILE_FIELD: &str = "file";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/identify-flower", post(identify_flower))
        // Leave headroom for multipart framing around the file itself
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}

/// Uploaded image pulled out of the multipart body.
struct Upload {
    content_type: String,
    bytes: Vec<u8>,
}

/// Read the `file` field, rejecting non-image uploads before the bytes are read.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest("File must be an image".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(format!(
                "Image too large. Max size is {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        return Ok(Upload {
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::BadRequest("Missing file field".to_string()))
}

/// Identify the flower in an uploaded image.
async fn identify_flower(
    State(state): State<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    mut multipart: Multipart,
) -> Result<Json<IdentificationResult>> {
    let classifier = state
        .classifier
        .clone()
        .ok_or_else(|| AppError::Configuration("Gemini API key not configured".to_string()))?;

    let upload = read_upload(&mut multipart).await?;

    tracing::info!(
        content_type = %upload.content_type,
        bytes = upload.bytes.len(),
        authenticated = caller.is_some(),
        "Identifying flower"
    );

    let staged = StagedImage::write(upload.bytes, &upload.content_type)
        .await
        .map_err(|e| AppError::Classification(format!("{:#}", e)))?;

    // The staged file is removed when `staged` drops, including on error.
    let raw = classifier.classify(&staged).await?;
    drop(staged);

    let reply = normalize_reply(&raw);
    let user_id = caller.map(|c| c.user_id().to_string());

    Ok(Json(IdentificationResult::from_reply(
        &reply,
        user_id,
        chrono::Utc::now(),
    )))
}
