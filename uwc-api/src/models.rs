use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use uwc_shared::types::{ProfileType, DEFAULT_SESSION_TYPE};

use crate::schema::{profiles, sessions};

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub location: Option<String>,
    pub looking_for: Option<String>,
    pub interests: Vec<String>,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    /// Opaque 0-100 value owned by the matching backend; never written here.
    pub compatibility_score: i32,
    pub online_status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub location: Option<String>,
    pub looking_for: Option<String>,
    pub interests: Option<Vec<String>>,
    pub profile_type: ProfileType,
    pub online_status: Option<bool>,
}

/// Fields an owner may change on an existing profile. `None` leaves the
/// column untouched; `type` is fixed at creation.
#[derive(Debug, AsChangeset, Default, Clone)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub location: Option<String>,
    pub looking_for: Option<String>,
    pub interests: Option<Vec<String>>,
    pub online_status: Option<bool>,
}

/// Body of `POST`/`PUT /profile`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProfilePayload {
    pub user_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub location: Option<String>,
    pub looking_for: Option<String>,
    pub interests: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub profile_type: Option<ProfileType>,
    pub online_status: Option<bool>,
}

impl ProfilePayload {
    pub fn into_new_profile(self, user_id: Uuid) -> NewProfile {
        NewProfile {
            id: Uuid::now_v7(),
            user_id,
            display_name: self.display_name,
            age: self.age,
            gender: self.gender,
            bio: self.bio,
            avatar_url: self.avatar_url,
            banner_url: self.banner_url,
            location: self.location,
            looking_for: self.looking_for,
            interests: self.interests,
            profile_type: self.profile_type.unwrap_or_default(),
            online_status: self.online_status,
        }
    }

    pub fn into_changeset(self) -> UpdateProfile {
        UpdateProfile {
            display_name: self.display_name,
            age: self.age,
            gender: self.gender,
            bio: self.bio,
            avatar_url: self.avatar_url,
            banner_url: self.banner_url,
            location: self.location,
            looking_for: self.looking_for,
            interests: self.interests,
            online_status: self.online_status,
        }
    }
}

// --- Session ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_uuid: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_uuid: String,
    pub session_type: String,
    pub token: String,
}

/// Body of `POST /sessions`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SessionPayload {
    pub user_id: Option<Uuid>,
    pub agent_uuid: Option<String>,
    #[serde(rename = "type")]
    pub session_type: Option<String>,
    pub token: Option<String>,
}

impl SessionPayload {
    pub fn into_new_session(self, user_id: Uuid, agent_uuid: String) -> NewSession {
        NewSession {
            id: Uuid::now_v7(),
            user_id,
            agent_uuid,
            session_type: self
                .session_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_TYPE.to_string()),
            token: self.token.unwrap_or_default(),
        }
    }
}

/// Body of `PUT /sessions?id=`. Ownership columns are not part of the
/// changeset, so unknown keys such as `user_id` are ignored.
#[derive(Debug, AsChangeset, Deserialize, Default, Clone)]
#[diesel(table_name = sessions)]
pub struct UpdateSession {
    pub agent_uuid: Option<String>,
    #[serde(rename = "type")]
    pub session_type: Option<String>,
    pub token: Option<String>,
}

impl UpdateSession {
    pub fn is_empty(&self) -> bool {
        self.agent_uuid.is_none() && self.session_type.is_none() && self.token.is_none()
    }
}
