use uwc_shared::types::media::ImageRejection;

use crate::voice_room::MediaError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Image(#[from] ImageRejection),

    /// The API answered with a non-2xx status; `message` is its `error` field.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The identity service refused the request.
    #[error("{0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_server_message() {
        let err = ClientError::Api {
            status: 403,
            message: "Cannot modify another user's profile".into(),
        };
        assert_eq!(err.to_string(), "Cannot modify another user's profile");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn image_rejection_keeps_user_facing_text() {
        let err: ClientError = ImageRejection::TooLarge.into();
        assert_eq!(err.to_string(), "File is too large. Maximum size is 5MB.");
        assert_eq!(err.status(), None);
    }
}
