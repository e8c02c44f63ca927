use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use uwc_shared::errors::{AppError, AppResult, ErrorCode};
use uwc_shared::middleware::{JsonBody, QueryParams};
use uwc_shared::types::auth::AuthUser;
use uwc_shared::types::ApiResponse;

use crate::services::voice_token::{create_voice_token, normalize_server_url, DEFAULT_ROOM};
use crate::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct TokenRequest {
    pub room: Option<String>,
    pub identity: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub url: String,
}

// --- GET /voice/token?room=&identity=&name= ---

pub async fn get_token(
    user: AuthUser,
    State(state): State<AppState>,
    QueryParams(req): QueryParams<TokenRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    issue_token(&state, &user, req)
}

// --- POST /voice/token ---

pub async fn post_token(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TokenRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    issue_token(&state, &user, req)
}

fn issue_token(
    state: &AppState,
    user: &AuthUser,
    req: TokenRequest,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let config = &state.config;

    let (Some(api_key), Some(api_secret)) = (
        config.livekit_api_key.as_deref().filter(|k| !k.is_empty()),
        config.livekit_api_secret.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::new(
            ErrorCode::VoiceNotConfigured,
            "Voice API key/secret not configured",
        ));
    };

    let url = config
        .livekit_url
        .as_deref()
        .and_then(normalize_server_url)
        .ok_or_else(|| {
            AppError::new(ErrorCode::VoiceNotConfigured, "Voice server URL is not set")
        })?;

    let room = req
        .room
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ROOM.to_string());
    let identity = req
        .identity
        .filter(|i| !i.trim().is_empty())
        .unwrap_or_else(|| user.id.to_string());

    let token = create_voice_token(
        api_key,
        api_secret,
        &room,
        &identity,
        req.name.as_deref(),
        config.voice_token_ttl_secs,
    )
    .map_err(|e| AppError::new(ErrorCode::VoiceTokenFailed, e.to_string()))?;

    tracing::info!(user_id = %user.id, room = %room, identity = %identity, "voice token issued");

    Ok(Json(ApiResponse::ok(TokenResponse { token, url })))
}
