use std::sync::Arc;

use uwc_api::config::{AppConfig, StorageBackend};
use uwc_api::store::{
    InMemoryProfileStore, InMemorySessionStore, PgProfileStore, PgSessionStore, ProfileStore,
    SessionStore,
};
use uwc_api::{build_router, AppState};
use uwc_shared::clients::db::create_pool;
use uwc_shared::clients::storage::{InMemoryStorage, ObjectStorage, S3Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    uwc_shared::middleware::init_tracing("uwc-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let (profiles, sessions, storage): (
        Arc<dyn ProfileStore>,
        Arc<dyn SessionStore>,
        Arc<dyn ObjectStorage>,
    ) = match config.storage {
        StorageBackend::Postgres => {
            let db = create_pool(&config.database_url, config.db_pool_size)?;
            let storage = S3Storage::new(
                &config.s3_endpoint,
                &config.s3_access_key,
                &config.s3_secret_key,
                &config.s3_bucket,
                &config.s3_public_url,
            )
            .await;
            (
                Arc::new(PgProfileStore::new(db.clone())),
                Arc::new(PgSessionStore::new(db)),
                Arc::new(storage),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            let public_url = format!("http://localhost:{port}/{}", config.s3_bucket);
            (
                Arc::new(InMemoryProfileStore::new()),
                Arc::new(InMemorySessionStore::new()),
                Arc::new(InMemoryStorage::new(public_url)),
            )
        }
    };

    let metrics = uwc_shared::middleware::init_metrics()?;
    let state = AppState::new(config, profiles, sessions, storage).with_metrics(metrics);

    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "uwc-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
