use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use uwc_shared::errors::{AppError, AppResult, ErrorCode};
use uwc_shared::middleware::{empty_as_none, JsonBody, QueryParams};
use uwc_shared::types::auth::AuthUser;
use uwc_shared::types::{ApiResponse, SuccessResponse};

use crate::models::{Session, SessionPayload, UpdateSession};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub id: Option<Uuid>,
}

fn require_id(query: &SessionQuery) -> AppResult<Uuid> {
    query
        .id
        .ok_or_else(|| AppError::new(ErrorCode::SessionIdRequired, "Session ID required"))
}

// --- GET /sessions[?id=] ---

pub async fn get_sessions(
    user: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SessionQuery>,
) -> AppResult<Response> {
    if let Some(id) = query.id {
        let session = state.sessions.find_for_user(id, user.id)?;
        return Ok(Json(ApiResponse::ok(session)).into_response());
    }

    let sessions = state.sessions.list_for_user(user.id)?;
    Ok(Json(ApiResponse::ok(sessions)).into_response())
}

// --- POST /sessions ---

pub async fn create_session(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SessionPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<Session>>)> {
    if payload.user_id != Some(user.id) {
        return Err(AppError::new(
            ErrorCode::CannotCreateOtherSession,
            "Cannot create session for another user",
        ));
    }

    let agent_uuid = payload
        .agent_uuid
        .clone()
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| AppError::Validation("agent_uuid is required".into()))?;

    let session = state
        .sessions
        .insert(payload.into_new_session(user.id, agent_uuid))?;

    tracing::info!(
        user_id = %user.id,
        session_id = %session.id,
        agent_uuid = %session.agent_uuid,
        "agent session created"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

// --- PUT /sessions?id= ---

/// A foreign or unknown id matches no row and yields `{ "data": null }`.
/// The id is checked before the body is looked at.
pub async fn update_session(
    user: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SessionQuery>,
    body: Result<JsonBody<UpdateSession>, AppError>,
) -> AppResult<Json<ApiResponse<Option<Session>>>> {
    let id = require_id(&query)?;
    let JsonBody(changes) = body?;
    let session = state.sessions.update_for_user(id, user.id, changes)?;

    if session.is_none() {
        tracing::debug!(user_id = %user.id, session_id = %id, "session update matched no rows");
    }

    Ok(Json(ApiResponse::ok(session)))
}

// --- DELETE /sessions?id= ---

pub async fn delete_session(
    user: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SessionQuery>,
) -> AppResult<Json<SuccessResponse>> {
    let id = require_id(&query)?;
    let deleted = state.sessions.delete_for_user(id, user.id)?;

    tracing::info!(user_id = %user.id, session_id = %id, deleted, "session delete");

    Ok(Json(SuccessResponse::ok()))
}
