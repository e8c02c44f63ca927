use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use uwc_shared::errors::{AppError, AppResult, ErrorCode};
use uwc_shared::types::auth::AuthUser;
use uwc_shared::types::media::{
    validate_image, ImageRejection, ImageSlot, UploadResponse, IMAGE_CACHE_CONTROL,
};
use uwc_shared::types::ApiResponse;

use crate::AppState;

// --- POST /storage/avatar ---

pub async fn upload_avatar(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    upload_image(&state, &user, ImageSlot::Avatar, multipart).await
}

// --- POST /storage/banner ---

pub async fn upload_banner(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    upload_image(&state, &user, ImageSlot::Banner, multipart).await
}

/// Delete-then-upload to the slot's fixed key, returning the public URL.
async fn upload_image(
    state: &AppState,
    user: &AuthUser,
    slot: ImageSlot,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ImageMissing, "No file provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read file data: {e}")))?;

    validate_image(&content_type, data.len() as u64).map_err(|rejection| {
        let code = match rejection {
            ImageRejection::InvalidType => ErrorCode::InvalidImageType,
            ImageRejection::TooLarge => ErrorCode::ImageTooLarge,
        };
        AppError::new(code, rejection.to_string())
    })?;

    let key = slot.object_key(user.id);

    // A missing previous object is fine; anything else is logged and the overwrite proceeds.
    if let Err(e) = state.storage.delete(&key).await {
        tracing::warn!(key = %key, error = %e, "could not delete previous image");
    }

    let url = state
        .storage
        .upload(&key, data.to_vec(), &content_type, IMAGE_CACHE_CONTROL)
        .await
        .map_err(|e| AppError::new(ErrorCode::UploadFailed, e.to_string()))?;

    tracing::info!(
        user_id = %user.id,
        slot = ?slot,
        url = %url,
        bytes = data.len(),
        "image uploaded"
    );

    Ok(Json(ApiResponse::ok(UploadResponse { url })))
}
