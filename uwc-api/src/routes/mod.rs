pub mod discover;
pub mod health;
pub mod media;
pub mod profile;
pub mod sessions;
pub mod voice;

use uwc_shared::errors::AppError;

/// Method fallback for every route, keeping the `{ "error": ... }` shape.
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}
