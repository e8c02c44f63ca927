use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use uwc_shared::clients::storage::ObjectStorage;
use uwc_shared::middleware::{metrics_middleware, AuthConfig};

pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use config::AppConfig;
use store::{ProfileStore, SessionStore};

/// Uploads are validated in the handler; the transport limit only has to be
/// large enough to let oversized files reach that check.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthConfig,
    pub profiles: Arc<dyn ProfileStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        profiles: Arc<dyn ProfileStore>,
        sessions: Arc<dyn SessionStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let auth = AuthConfig::new(config.jwt_secret.as_str());
        Self {
            config: Arc::new(config),
            auth,
            profiles,
            sessions,
            storage,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl FromRef<AppState> for AuthConfig {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    use routes::{discover, health, media, method_not_allowed, profile, sessions, voice};

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route(
            "/profile",
            get(profile::get_profile)
                .post(profile::upsert_profile)
                .put(profile::upsert_profile)
                .fallback(method_not_allowed),
        )
        .route(
            "/discover",
            get(discover::discover).fallback(method_not_allowed),
        )
        .route(
            "/sessions",
            get(sessions::get_sessions)
                .post(sessions::create_session)
                .put(sessions::update_session)
                .delete(sessions::delete_session)
                .fallback(method_not_allowed),
        )
        .route(
            "/storage/avatar",
            post(media::upload_avatar)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/storage/banner",
            post(media::upload_banner)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/voice/token",
            get(voice::get_token)
                .post(voice::post_token)
                .fallback(method_not_allowed),
        )
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
