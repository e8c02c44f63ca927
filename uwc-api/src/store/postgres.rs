use diesel::prelude::*;
use uuid::Uuid;

use uwc_shared::clients::db::DbPool;
use uwc_shared::errors::{AppError, AppResult};
use uwc_shared::types::ProfileType;

use crate::models::{NewProfile, NewSession, Profile, Session, UpdateProfile, UpdateSession};
use crate::schema::{profiles, sessions};

use super::{ProfileStore, SessionStore};

type PooledConn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>;

fn checkout(pool: &DbPool) -> AppResult<PooledConn> {
    pool.get().map_err(|e| AppError::internal(e.to_string()))
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: DbPool,
}

impl PgProfileStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProfileStore for PgProfileStore {
    fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let mut conn = checkout(&self.pool)?;

        let profile = profiles::table
            .filter(profiles::user_id.eq(user_id))
            .first::<Profile>(&mut conn)
            .optional()?;

        Ok(profile)
    }

    fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let mut conn = checkout(&self.pool)?;

        let profile = profiles::table
            .filter(profiles::id.eq(id))
            .first::<Profile>(&mut conn)
            .optional()?;

        Ok(profile)
    }

    fn list_excluding_user(
        &self,
        user_id: Uuid,
        profile_type: Option<ProfileType>,
    ) -> AppResult<Vec<Profile>> {
        let mut conn = checkout(&self.pool)?;

        let mut query = profiles::table
            .filter(profiles::user_id.ne(user_id))
            .into_boxed();

        if let Some(t) = profile_type {
            query = query.filter(profiles::profile_type.eq(t));
        }

        Ok(query.load::<Profile>(&mut conn)?)
    }

    fn insert(&self, new_profile: NewProfile) -> AppResult<Profile> {
        let mut conn = checkout(&self.pool)?;

        let profile = diesel::insert_into(profiles::table)
            .values(&new_profile)
            .get_result::<Profile>(&mut conn)?;

        Ok(profile)
    }

    fn update_by_user_id(&self, user_id: Uuid, changes: UpdateProfile) -> AppResult<Profile> {
        let mut conn = checkout(&self.pool)?;

        let profile = diesel::update(profiles::table.filter(profiles::user_id.eq(user_id)))
            .set((&changes, profiles::updated_at.eq(chrono::Utc::now())))
            .get_result::<Profile>(&mut conn)?;

        Ok(profile)
    }

    fn ping(&self) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PgSessionStore {
    fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let mut conn = checkout(&self.pool)?;

        let rows = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .order(sessions::created_at.desc())
            .load::<Session>(&mut conn)?;

        Ok(rows)
    }

    fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Session>> {
        let mut conn = checkout(&self.pool)?;

        let session = sessions::table
            .filter(sessions::id.eq(id))
            .filter(sessions::user_id.eq(user_id))
            .first::<Session>(&mut conn)
            .optional()?;

        Ok(session)
    }

    fn insert(&self, new_session: NewSession) -> AppResult<Session> {
        let mut conn = checkout(&self.pool)?;

        let session = diesel::insert_into(sessions::table)
            .values(&new_session)
            .get_result::<Session>(&mut conn)?;

        Ok(session)
    }

    fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateSession,
    ) -> AppResult<Option<Session>> {
        // Diesel refuses an empty SET clause.
        if changes.is_empty() {
            return self.find_for_user(id, user_id);
        }

        let mut conn = checkout(&self.pool)?;

        let session = diesel::update(
            sessions::table
                .filter(sessions::id.eq(id))
                .filter(sessions::user_id.eq(user_id)),
        )
        .set(&changes)
        .get_result::<Session>(&mut conn)
        .optional()?;

        Ok(session)
    }

    fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<usize> {
        let mut conn = checkout(&self.pool)?;

        let deleted = diesel::delete(
            sessions::table
                .filter(sessions::id.eq(id))
                .filter(sessions::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }
}
