use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use uwc_shared::types::media::{ImageSlot, UploadResponse};
use uwc_shared::types::{ApiErrorResponse, ApiResponse, ProfileType, SuccessResponse};

use crate::auth::AuthClient;
use crate::error::{ClientError, ClientResult};
use crate::image::ImageFile;
use crate::models::{
    NewSession, Profile, ProfileUpdate, Session, SessionUpdate, VoiceToken, VoiceTokenRequest,
};

/// Authenticated client for the uwc-api endpoints. Every call attaches the
/// current session's bearer token and fails with `NotAuthenticated` without one.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthClient,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str, auth: AuthClient) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.auth.access_token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token))
    }

    // --- Profile ---

    /// `None` reads the caller's own profile.
    pub async fn get_profile(&self, user_id: Option<Uuid>) -> ClientResult<Option<Profile>> {
        let mut req = self.request(Method::GET, "/profile")?;
        if let Some(id) = user_id {
            req = req.query(&[("user_id", id)]);
        }
        read_data(req.send().await?, "Failed to fetch profile").await
    }

    pub async fn save_profile(&self, update: &ProfileUpdate) -> ClientResult<Profile> {
        let req = self.request(Method::POST, "/profile")?.json(update);
        read_data(req.send().await?, "Failed to save profile").await
    }

    // --- Discover ---

    pub async fn discover(&self, profile_type: Option<ProfileType>) -> ClientResult<Vec<Profile>> {
        let mut req = self.request(Method::GET, "/discover")?;
        if let Some(t) = profile_type {
            req = req.query(&[("type", t.as_str())]);
        }
        let profiles: Option<Vec<Profile>> =
            read_data(req.send().await?, "Failed to fetch profiles").await?;
        Ok(profiles.unwrap_or_default())
    }

    pub async fn profile_by_id(&self, id: Uuid) -> ClientResult<Option<Profile>> {
        let req = self.request(Method::GET, "/discover")?.query(&[("id", id)]);
        read_data(req.send().await?, "Failed to fetch profile").await
    }

    // --- Sessions ---

    pub async fn list_sessions(&self) -> ClientResult<Vec<Session>> {
        let req = self.request(Method::GET, "/sessions")?;
        let sessions: Option<Vec<Session>> =
            read_data(req.send().await?, "Failed to fetch sessions").await?;
        Ok(sessions.unwrap_or_default())
    }

    pub async fn get_session(&self, id: Uuid) -> ClientResult<Option<Session>> {
        let req = self.request(Method::GET, "/sessions")?.query(&[("id", id)]);
        read_data(req.send().await?, "Failed to fetch session").await
    }

    pub async fn create_session(&self, session: &NewSession) -> ClientResult<Session> {
        let req = self.request(Method::POST, "/sessions")?.json(session);
        read_data(req.send().await?, "Failed to create session").await
    }

    /// `None` when no session with that id belongs to the caller.
    pub async fn update_session(
        &self,
        id: Uuid,
        changes: &SessionUpdate,
    ) -> ClientResult<Option<Session>> {
        let req = self
            .request(Method::PUT, "/sessions")?
            .query(&[("id", id)])
            .json(changes);
        read_data(req.send().await?, "Failed to update session").await
    }

    pub async fn delete_session(&self, id: Uuid) -> ClientResult<()> {
        let req = self.request(Method::DELETE, "/sessions")?.query(&[("id", id)]);
        let response = req.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "Failed to delete session").await);
        }
        let _: SuccessResponse = response.json().await?;
        Ok(())
    }

    // --- Storage ---

    /// Validates locally, then uploads; returns the image's public URL.
    pub async fn upload_image(&self, slot: ImageSlot, file: ImageFile) -> ClientResult<String> {
        file.validate()?;

        let path = match slot {
            ImageSlot::Avatar => "/storage/avatar",
            ImageSlot::Banner => "/storage/banner",
        };
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let req = self.request(Method::POST, path)?.multipart(form);
        let upload: UploadResponse = read_data(req.send().await?, "Upload failed").await?;
        Ok(upload.url)
    }

    // --- Voice ---

    pub async fn voice_token(&self, request: &VoiceTokenRequest) -> ClientResult<VoiceToken> {
        let req = self.request(Method::POST, "/voice/token")?.json(request);
        read_data(req.send().await?, "Failed to fetch voice token").await
    }
}

async fn read_data<T: DeserializeOwned>(response: Response, fallback: &str) -> ClientResult<T> {
    if !response.status().is_success() {
        return Err(api_error(response, fallback).await);
    }
    let body: ApiResponse<T> = response.json().await?;
    Ok(body.data)
}

async fn api_error(response: Response, fallback: &str) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<ApiErrorResponse>()
        .await
        .map(|e| e.error)
        .unwrap_or_else(|_| fallback.to_string());

    tracing::debug!(status, message = %message, "api request failed");
    ClientError::Api { status, message }
}
