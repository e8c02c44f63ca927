pub mod api;
pub mod auth;
pub mod config;
pub mod discover;
pub mod error;
pub mod image;
pub mod models;
pub mod profile_form;
pub mod voice_room;

pub use api::ApiClient;
pub use auth::{AuthClient, AuthSession, CurrentUser, SignUpOutcome};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};

use std::time::Duration;

/// Identity and API clients sharing one HTTP connection pool and one session.
#[derive(Clone)]
pub struct Client {
    pub auth: AuthClient,
    pub api: ApiClient,
}

impl Client {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let auth = AuthClient::new(http.clone(), config);
        let api = ApiClient::new(http, &config.api_url, auth.clone());
        Ok(Self { auth, api })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(&ClientConfig::load()?)
    }
}
