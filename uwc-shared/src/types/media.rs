use serde::{Deserialize, Serialize};

/// Largest image accepted for avatars and banners.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

pub const IMAGE_CACHE_CONTROL: &str = "max-age=3600";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageRejection {
    #[error("Invalid file type. Please upload a JPEG, PNG, WebP, or GIF image.")]
    InvalidType,

    #[error("File is too large. Maximum size is 5MB.")]
    TooLarge,
}

/// Checks an image's declared MIME type and size. The type is checked first.
pub fn validate_image(content_type: &str, size: u64) -> Result<(), ImageRejection> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ImageRejection::InvalidType);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ImageRejection::TooLarge);
    }
    Ok(())
}

/// The two per-user image slots. Each maps to one fixed object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    Avatar,
    Banner,
}

impl ImageSlot {
    pub fn object_key(&self, user_id: uuid::Uuid) -> String {
        match self {
            ImageSlot::Avatar => format!("profile_pic/{user_id}"),
            ImageSlot::Banner => format!("Banner/{user_id}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_listed_type_at_the_limit() {
        for ty in ALLOWED_IMAGE_TYPES {
            assert_eq!(validate_image(ty, MAX_IMAGE_BYTES), Ok(()));
        }
    }

    #[test]
    fn rejects_bmp_and_oversized_files() {
        assert_eq!(validate_image("image/bmp", 1024), Err(ImageRejection::InvalidType));
        assert_eq!(validate_image("image/png", 6 * 1024 * 1024), Err(ImageRejection::TooLarge));
    }

    #[test]
    fn slot_keys_are_fixed_per_user() {
        let id = uuid::Uuid::nil();
        assert_eq!(ImageSlot::Avatar.object_key(id), format!("profile_pic/{id}"));
        assert_eq!(ImageSlot::Banner.object_key(id), format!("Banner/{id}"));
    }
}
