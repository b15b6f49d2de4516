use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{MemoryUserStore, PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::posts::repo::{MemoryPostStore, PgPostStore, PostStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
}

impl AppState {
    /// Builds the state from the environment: Postgres when `DATABASE_URL` is
    /// set, otherwise the in-memory store.
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let Some(url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            return Ok(Self::in_memory(config));
        };

        let db = connect(&url).await?;
        info!("database connected");
        Ok(Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgPostStore::new(db)),
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
    ) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            config: Arc::new(config),
            keys,
            users,
            posts,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryPostStore::new()),
        )
    }
}

async fn connect(url: &str) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    Ok(db)
}
