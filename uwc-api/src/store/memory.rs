use std::sync::RwLock;

use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use uwc_shared::errors::{AppError, AppResult};
use uwc_shared::types::ProfileType;

use crate::models::{NewProfile, NewSession, Profile, Session, UpdateProfile, UpdateSession};

use super::{ProfileStore, SessionStore};

fn poisoned<E: std::fmt::Display>(e: E) -> AppError {
    AppError::internal(format!("store lock poisoned: {e}"))
}

/// Process-local profile table. Rows keep insertion order, mirroring an
/// unordered heap scan closely enough for local runs and tests.
#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: RwLock<Vec<Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_for_user(&self, user_id: Uuid) -> usize {
        self.rows
            .read()
            .map(|rows| rows.iter().filter(|p| p.user_id == user_id).count())
            .unwrap_or(0)
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.iter().find(|p| p.user_id == user_id).cloned())
    }

    fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    fn list_excluding_user(
        &self,
        user_id: Uuid,
        profile_type: Option<ProfileType>,
    ) -> AppResult<Vec<Profile>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .iter()
            .filter(|p| p.user_id != user_id)
            .filter(|p| profile_type.map_or(true, |t| p.profile_type == t))
            .cloned()
            .collect())
    }

    fn insert(&self, new_profile: NewProfile) -> AppResult<Profile> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        if rows.iter().any(|p| p.user_id == new_profile.user_id) {
            return Err(AppError::Database(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new(String::from(
                    "duplicate key value violates unique constraint \"idx_profiles_user_id\"",
                )),
            )));
        }

        let now = Utc::now();
        let profile = Profile {
            id: new_profile.id,
            user_id: new_profile.user_id,
            display_name: new_profile.display_name,
            age: new_profile.age,
            gender: new_profile.gender,
            bio: new_profile.bio,
            avatar_url: new_profile.avatar_url,
            banner_url: new_profile.banner_url,
            location: new_profile.location,
            looking_for: new_profile.looking_for,
            interests: new_profile.interests.unwrap_or_default(),
            profile_type: new_profile.profile_type,
            compatibility_score: 0,
            online_status: new_profile.online_status.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };

        rows.push(profile.clone());
        Ok(profile)
    }

    fn update_by_user_id(&self, user_id: Uuid, changes: UpdateProfile) -> AppResult<Profile> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        let row = rows
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or(AppError::Database(DieselError::NotFound))?;

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = changes.$field { row.$field = Some(v); })*
            };
        }
        apply!(display_name, age, gender, bio, avatar_url, banner_url, location, looking_for);

        if let Some(interests) = changes.interests {
            row.interests = interests;
        }
        if let Some(online) = changes.online_status {
            row.online_status = online;
        }
        row.updated_at = Utc::now();

        Ok(row.clone())
    }

    fn ping(&self) -> AppResult<()> {
        self.rows.read().map_err(poisoned).map(|_| ())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    rows: RwLock<Vec<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let rows = self.rows.read().map_err(poisoned)?;
        // Reverse first so equal timestamps keep newest-inserted first under the stable sort.
        let mut owned: Vec<Session> = rows
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Session>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .iter()
            .find(|s| s.id == id && s.user_id == user_id)
            .cloned())
    }

    fn insert(&self, new_session: NewSession) -> AppResult<Session> {
        let session = Session {
            id: new_session.id,
            user_id: new_session.user_id,
            agent_uuid: new_session.agent_uuid,
            session_type: new_session.session_type,
            token: new_session.token,
            created_at: Utc::now(),
        };

        self.rows.write().map_err(poisoned)?.push(session.clone());
        Ok(session)
    }

    fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateSession,
    ) -> AppResult<Option<Session>> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        let Some(row) = rows.iter_mut().find(|s| s.id == id && s.user_id == user_id) else {
            return Ok(None);
        };

        if let Some(agent_uuid) = changes.agent_uuid {
            row.agent_uuid = agent_uuid;
        }
        if let Some(session_type) = changes.session_type {
            row.session_type = session_type;
        }
        if let Some(token) = changes.token {
            row.token = token;
        }

        Ok(Some(row.clone()))
    }

    fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<usize> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        let before = rows.len();
        rows.retain(|s| !(s.id == id && s.user_id == user_id));
        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_session(user_id: Uuid, agent: &str) -> NewSession {
        NewSession {
            id: Uuid::now_v7(),
            user_id,
            agent_uuid: agent.to_string(),
            session_type: "ai".to_string(),
            token: String::new(),
        }
    }

    #[test]
    fn sessions_list_newest_first() {
        let store = InMemorySessionStore::new();
        let user = Uuid::new_v4();
        store.insert(new_session(user, "first")).unwrap();
        store.insert(new_session(user, "second")).unwrap();
        store.insert(new_session(Uuid::new_v4(), "other")).unwrap();

        let listed = store.list_for_user(user).unwrap();
        let agents: Vec<_> = listed.iter().map(|s| s.agent_uuid.as_str()).collect();
        assert_eq!(agents, vec!["second", "first"]);
    }

    #[test]
    fn foreign_update_and_delete_match_nothing() {
        let store = InMemorySessionStore::new();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let session = store.insert(new_session(owner, "agent")).unwrap();

        let changes = UpdateSession { token: Some("stolen".into()), ..Default::default() };
        assert_eq!(store.update_for_user(session.id, intruder, changes).unwrap(), None);
        assert_eq!(store.delete_for_user(session.id, intruder).unwrap(), 0);

        let still = store.find_for_user(session.id, owner).unwrap().unwrap();
        assert_eq!(still.token, "");
    }

    fn new_profile(user_id: Uuid) -> NewProfile {
        NewProfile {
            id: Uuid::now_v7(),
            user_id,
            display_name: Some("Ava".into()),
            age: Some(20),
            gender: None,
            bio: Some("hi".into()),
            avatar_url: None,
            banner_url: None,
            location: None,
            looking_for: None,
            interests: Some(vec!["Coffee".into()]),
            profile_type: ProfileType::Human,
            online_status: Some(true),
        }
    }

    #[test]
    fn profile_update_leaves_absent_fields() {
        let store = InMemoryProfileStore::new();
        let user = Uuid::new_v4();
        store.insert(new_profile(user)).unwrap();

        let updated = store
            .update_by_user_id(user, UpdateProfile { age: Some(21), ..Default::default() })
            .unwrap();
        assert_eq!(updated.age, Some(21));
        assert_eq!(updated.display_name.as_deref(), Some("Ava"));
        assert_eq!(updated.interests, vec!["Coffee".to_string()]);
    }

    #[test]
    fn second_profile_row_for_a_user_is_rejected() {
        let store = InMemoryProfileStore::new();
        let user = Uuid::new_v4();
        store.insert(new_profile(user)).unwrap();

        let err = store.insert(new_profile(user)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
        ));
        assert_eq!(store.count_for_user(user), 1);
    }

    #[test]
    fn profiles_migration_keeps_one_row_per_user() {
        let up = include_str!("../../migrations/2024-11-02-000000_create_profiles/up.sql");
        assert!(up.contains("CREATE UNIQUE INDEX idx_profiles_user_id ON profiles (user_id)"));
    }
}
