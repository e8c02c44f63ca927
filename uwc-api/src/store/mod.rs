//! Persistence seams for profiles and agent sessions.
//!
//! Every mutating method takes the caller's `user_id` and scopes its
//! predicate with it, so a foreign row id simply matches nothing.

mod memory;
mod postgres;

pub use memory::{InMemoryProfileStore, InMemorySessionStore};
pub use postgres::{PgProfileStore, PgSessionStore};

use uuid::Uuid;

use uwc_shared::errors::AppResult;
use uwc_shared::types::ProfileType;

use crate::models::{NewProfile, NewSession, Profile, Session, UpdateProfile, UpdateSession};

pub trait ProfileStore: Send + Sync {
    fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Profile>>;

    fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>>;

    /// All profiles not owned by `user_id`, optionally restricted to one type.
    fn list_excluding_user(
        &self,
        user_id: Uuid,
        profile_type: Option<ProfileType>,
    ) -> AppResult<Vec<Profile>>;

    fn insert(&self, new_profile: NewProfile) -> AppResult<Profile>;

    fn update_by_user_id(&self, user_id: Uuid, changes: UpdateProfile) -> AppResult<Profile>;

    /// Connectivity check for `/health`.
    fn ping(&self) -> AppResult<()>;
}

pub trait SessionStore: Send + Sync {
    /// Newest first.
    fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Session>>;

    fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Session>>;

    fn insert(&self, new_session: NewSession) -> AppResult<Session>;

    /// Returns `None` when no row matches `id AND user_id`.
    fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateSession,
    ) -> AppResult<Option<Session>>;

    /// Returns the number of rows removed (0 or 1).
    fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<usize>;
}
