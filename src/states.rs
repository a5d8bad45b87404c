use crate::{
    auth::PasswordHasher,
    config::Config,
    db,
    notify::{self, Notifier},
    session::SessionStore,
    storage::{HttpObjectStore, ObjectStore},
};
use anyhow::Context;
use axum::extract::FromRef;
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;

// ============================================================================
// APPLICATION STATE - Shared handles, cloned into every request
// ============================================================================
/// Handlers pull what they need through `State<AppState>`; the session
/// extractors reach `sessions` through `FromRef`. Nothing here is a global.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: SqlitePool,
    pub sessions: SessionStore,
    pub hasher: PasswordHasher,
    pub storage: Arc<dyn ObjectStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Connect to the database, bootstrap the schema and wire the
    /// outbound clients described by `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database_url).await?;
        db::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            sessions: SessionStore::new(
                &config.session_secret,
                Duration::hours(config.session_ttl_hours),
            ),
            hasher: PasswordHasher::new(config.bcrypt_cost),
            storage: Arc::new(
                HttpObjectStore::new(&config.storage).context("build object store client")?,
            ),
            notifier: notify::from_config(&config.notify).context("build notifier client")?,
        })
    }
}
