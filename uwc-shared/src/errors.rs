use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: Profile and discover errors
/// - E3xxx: Session errors
/// - E4xxx: Media upload errors
/// - E5xxx: Voice room errors
///
/// Codes are logged, never serialized: clients only see `{ "error": message }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    DatabaseError,
    MethodNotAllowed,

    // Auth (E1xxx)
    MissingAuthHeader,
    TokenExpired,
    TokenInvalid,

    // Profile (E2xxx)
    CannotModifyOtherProfile,

    // Session (E3xxx)
    CannotCreateOtherSession,
    SessionIdRequired,

    // Media (E4xxx)
    InvalidImageType,
    ImageTooLarge,
    ImageMissing,
    UploadFailed,

    // Voice (E5xxx)
    VoiceNotConfigured,
    VoiceTokenFailed,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::DatabaseError => "E0003",
            Self::MethodNotAllowed => "E0004",

            // Auth
            Self::MissingAuthHeader => "E1001",
            Self::TokenExpired => "E1002",
            Self::TokenInvalid => "E1003",

            // Profile
            Self::CannotModifyOtherProfile => "E2001",

            // Session
            Self::CannotCreateOtherSession => "E3001",
            Self::SessionIdRequired => "E3002",

            // Media
            Self::InvalidImageType => "E4001",
            Self::ImageTooLarge => "E4002",
            Self::ImageMissing => "E4003",
            Self::UploadFailed => "E4004",

            // Voice
            Self::VoiceNotConfigured => "E5001",
            Self::VoiceTokenFailed => "E5002",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::UploadFailed | Self::VoiceNotConfigured
            | Self::VoiceTokenFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::DatabaseError | Self::SessionIdRequired
            | Self::InvalidImageType | Self::ImageTooLarge | Self::ImageMissing => {
                StatusCode::BAD_REQUEST
            }
            Self::MissingAuthHeader | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::CannotModifyOtherProfile | Self::CannotCreateOtherSession => {
                StatusCode::FORBIDDEN
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
    },

    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    #[error("{0}")]
    Database(#[from] diesel::result::Error),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(ErrorCode::MethodNotAllowed, "Method not allowed")
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }

    /// Query failures are reported as client errors with the store's message.
    pub fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = code.status_code();

        match &self {
            AppError::Internal(err) => {
                tracing::error!(code = code.code(), error = ?err, "internal server error");
            }
            AppError::Database(err) => {
                tracing::warn!(code = code.code(), error = %err, "database error");
            }
            _ if status.is_server_error() => {
                tracing::error!(code = code.code(), status = status.as_u16(), "{self}");
            }
            _ => {
                tracing::warn!(code = code.code(), status = status.as_u16(), "{self}");
            }
        }

        (status, Json(ApiErrorResponse::new(self.to_string()))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
