use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::errors::StoreError;

/// Thin wrapper over a bounded Postgres connection pool. Holds no
/// business logic; bulk-write semantics live in [`crate::repository`].
#[derive(Clone)]
pub struct StoreClient {
    pool: PgPool,
}

impl StoreClient {
    #[instrument(skip(url))]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(StoreError::Other)?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| StoreError::Other(e.into()))?;

        info!(max_connections, "store connected and migrated");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
