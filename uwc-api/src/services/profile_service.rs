use uwc_shared::errors::{AppError, AppResult, ErrorCode};
use uwc_shared::types::auth::AuthUser;

use crate::models::{Profile, ProfilePayload};
use crate::store::ProfileStore;

/// Creates the caller's profile on first save and updates it in place
/// afterwards. Re-submitting the same payload re-applies the same values.
pub fn upsert_profile(
    store: &dyn ProfileStore,
    user: &AuthUser,
    payload: ProfilePayload,
) -> AppResult<Profile> {
    if payload.user_id != Some(user.id) {
        return Err(AppError::new(
            ErrorCode::CannotModifyOtherProfile,
            "Cannot modify another user's profile",
        ));
    }

    let profile = match store.find_by_user_id(user.id)? {
        Some(_) => {
            let profile = store.update_by_user_id(user.id, payload.into_changeset())?;
            tracing::info!(user_id = %user.id, profile_id = %profile.id, "profile updated");
            profile
        }
        None => {
            let profile = store.insert(payload.into_new_profile(user.id))?;
            tracing::info!(
                user_id = %user.id,
                profile_id = %profile.id,
                profile_type = %profile.profile_type,
                "profile created"
            );
            profile
        }
    };

    Ok(profile)
}
