pub mod profile_service;
pub mod voice_token;
