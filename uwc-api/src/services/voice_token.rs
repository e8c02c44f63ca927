use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Room every voice chat joins unless the caller names another.
pub const DEFAULT_ROOM: &str = "voice-room";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoGrant {
    #[serde(rename = "roomJoin")]
    pub room_join: bool,
    pub room: String,
}

/// Claims understood by the media server's access-token verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceTokenClaims {
    /// API key the token was signed for.
    pub iss: String,
    /// Participant identity inside the room.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}

/// Sign a room-join token for `identity`.
pub fn create_voice_token(
    api_key: &str,
    api_secret: &str,
    room: &str,
    identity: &str,
    name: Option<&str>,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();

    let claims = VoiceTokenClaims {
        iss: api_key.to_string(),
        sub: identity.to_string(),
        name: name.map(str::to_string),
        nbf: now,
        exp: now + ttl_secs as i64,
        video: VideoGrant {
            room_join: true,
            room: room.to_string(),
        },
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
}

pub fn verify_voice_token(
    api_secret: &str,
    token: &str,
) -> Result<VoiceTokenClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<VoiceTokenClaims>(
        token,
        &DecodingKey::from_secret(api_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}

/// Browsers connect over websockets: `https` becomes `wss`, `http` becomes
/// `ws`, and a bare host gets `wss://`.
pub fn normalize_server_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let normalized = if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if url.starts_with("wss://") || url.starts_with("ws://") {
        url.to_string()
    } else {
        format!("wss://{url}")
    };

    Some(normalized)
}
