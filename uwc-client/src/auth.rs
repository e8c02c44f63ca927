//! Session provider for the GoTrue-compatible identity service.
//!
//! The current session lives in a `watch` channel so pages can react to
//! sign-in and sign-out without polling.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: CurrentUser,
}

/// What a successful sign-up produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(CurrentUser),
    /// The account exists but must confirm its email before signing in.
    ConfirmationRequired(CurrentUser),
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(CurrentUser),
}

/// GoTrue has used several error shapes over time.
#[derive(Deserialize, Default)]
struct IdentityError {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl IdentityError {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Checks sign-up input before it is sent.
pub fn validate_sign_up(password: &str, confirm_password: &str) -> ClientResult<()> {
    if password != confirm_password {
        return Err(ClientError::Validation("Passwords do not match".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: watch::Sender<Option<AuthSession>>,
}

/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<Inner>,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.auth_url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
                session,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.inner.session.subscribe()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.inner.session.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Adopt a session obtained elsewhere, e.g. restored from disk.
    pub fn set_session(&self, session: Option<AuthSession>) {
        self.inner.session.send_replace(session);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<CurrentUser> {
        let response = self
            .request(reqwest::Method::POST, "/token")
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password })
            .send()
            .await?;

        let session: AuthSession = read_identity(response, "Sign in failed").await?;
        let user = session.user.clone();
        self.set_session(Some(session));

        tracing::info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> ClientResult<SignUpOutcome> {
        validate_sign_up(password, confirm_password)?;

        let response = self
            .request(reqwest::Method::POST, "/signup")
            .json(&Credentials { email, password })
            .send()
            .await?;

        match read_identity(response, "Sign up failed").await? {
            SignUpResponse::Session(session) => {
                let user = session.user.clone();
                self.set_session(Some(session));
                tracing::info!(user_id = %user.id, "signed up");
                Ok(SignUpOutcome::SignedIn(user))
            }
            SignUpResponse::User(user) => {
                tracing::info!(user_id = %user.id, "signed up, confirmation pending");
                Ok(SignUpOutcome::ConfirmationRequired(user))
            }
        }
    }

    /// Clears the local session even when the server call fails.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };

        let result = self
            .request(reqwest::Method::POST, "/logout")
            .bearer_auth(token)
            .send()
            .await;

        self.set_session(None);

        match result {
            Ok(r) if r.status().is_success() => {}
            Ok(r) => tracing::warn!(status = %r.status(), "remote sign out rejected"),
            Err(e) => tracing::warn!(error = %e, "remote sign out failed"),
        }
        Ok(())
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/auth/v1{}", self.inner.base_url, path);
        let builder = self.inner.http.request(method, url);
        if self.inner.anon_key.is_empty() {
            builder
        } else {
            builder.header("apikey", &self.inner.anon_key)
        }
    }
}

async fn read_identity<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> ClientResult<T> {
    if response.status().is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .json::<IdentityError>()
        .await
        .ok()
        .and_then(IdentityError::into_message)
        .unwrap_or_else(|| fallback.to_string());
    Err(ClientError::Auth(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> AuthClient {
        // Port 9 (discard) is never served; any request would fail with Http.
        AuthClient::new(
            reqwest::Client::new(),
            &ClientConfig::new("http://127.0.0.1:9", "http://127.0.0.1:9"),
        )
    }

    #[test]
    fn mismatched_passwords_rejected_first() {
        let err = validate_sign_up("abc", "abcd").unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn short_password_rejected() {
        let err = validate_sign_up("abc12", "abc12").unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
        assert!(validate_sign_up("abc123", "abc123").is_ok());
    }

    #[tokio::test]
    async fn sign_up_validates_before_network() {
        let client = offline_client();
        let err = client.sign_up("a@uw.edu", "secret1", "secret2").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn sign_out_without_session_is_noop() {
        let client = offline_client();
        client.sign_out().await.unwrap();
        assert!(client.current_user().is_none());
    }

    #[test]
    fn subscribers_observe_session_changes() {
        let client = offline_client();
        let rx = client.subscribe();
        assert!(rx.borrow().is_none());

        let user = CurrentUser { id: Uuid::new_v4(), email: Some("a@uw.edu".into()) };
        client.set_session(Some(AuthSession {
            access_token: "t".into(),
            refresh_token: None,
            expires_in: Some(3600),
            user: user.clone(),
        }));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().as_ref().map(|s| s.user.clone()), Some(user.clone()));
        assert_eq!(client.current_user(), Some(user));
        assert_eq!(client.access_token().as_deref(), Some("t"));
    }

    #[test]
    fn identity_error_prefers_description() {
        let err: IdentityError = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(err.into_message().as_deref(), Some("Invalid login credentials"));

        let err: IdentityError =
            serde_json::from_str(r#"{"code":422,"msg":"User already registered"}"#).unwrap();
        assert_eq!(err.into_message().as_deref(), Some("User already registered"));
    }

    #[test]
    fn sign_up_response_distinguishes_session_from_user() {
        let id = Uuid::new_v4();
        let with_session: SignUpResponse = serde_json::from_value(serde_json::json!({
            "access_token": "t",
            "user": { "id": id, "email": "a@uw.edu" }
        }))
        .unwrap();
        assert!(matches!(with_session, SignUpResponse::Session(_)));

        let pending: SignUpResponse =
            serde_json::from_value(serde_json::json!({ "id": id, "email": "a@uw.edu" })).unwrap();
        assert!(matches!(pending, SignUpResponse::User(u) if u.id == id));
    }
}
