use axum::extract::State;
use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use uwc_shared::errors::AppResult;
use uwc_shared::middleware::{empty_as_none, QueryParams};
use uwc_shared::types::auth::AuthUser;
use uwc_shared::types::{ApiResponse, ProfileType};

use crate::models::Profile;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub profile_type: Option<String>,
}

/// GET /discover[?type=human|ai] or GET /discover?id=<profile id>
///
/// The listing never contains the caller's own profile. A lookup by id
/// returns the row whoever owns it. `type` is compared exactly, so a value
/// no profile can carry yields an empty listing.
pub async fn discover(
    user: AuthUser,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<DiscoverParams>,
) -> AppResult<Response> {
    if let Some(id) = params.id {
        let profile = state.profiles.find_by_id(id)?;
        return Ok(Json(ApiResponse::ok(profile)).into_response());
    }

    let profile_type = match params.profile_type.as_deref().filter(|t| !t.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<ProfileType>() {
            Ok(t) => Some(t),
            Err(_) => {
                tracing::debug!(
                    user_id = %user.id,
                    profile_type = %raw,
                    "no profiles of this type"
                );
                return Ok(Json(ApiResponse::ok(Vec::<Profile>::new())).into_response());
            }
        },
    };

    let profiles = state.profiles.list_excluding_user(user.id, profile_type)?;

    tracing::debug!(
        user_id = %user.id,
        profile_type = ?profile_type,
        count = profiles.len(),
        "discover listing"
    );

    Ok(Json(ApiResponse::ok(profiles)).into_response())
}
