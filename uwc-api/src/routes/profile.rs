use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use uwc_shared::errors::AppResult;
use uwc_shared::middleware::{empty_as_none, JsonBody, QueryParams};
use uwc_shared::types::auth::AuthUser;
use uwc_shared::types::ApiResponse;

use crate::models::{Profile, ProfilePayload};
use crate::services::profile_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<Uuid>,
}

// --- GET /profile[?user_id=] ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProfileQuery>,
) -> AppResult<Json<ApiResponse<Option<Profile>>>> {
    let user_id = query.user_id.unwrap_or(user.id);
    let profile = state.profiles.find_by_user_id(user_id)?;

    Ok(Json(ApiResponse::ok(profile)))
}

// --- POST/PUT /profile ---

pub async fn upsert_profile(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProfilePayload>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = profile_service::upsert_profile(state.profiles.as_ref(), &user, payload)?;

    Ok(Json(ApiResponse::ok(profile)))
}
