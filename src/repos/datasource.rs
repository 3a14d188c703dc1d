//! Pooled datasource interface used by the query executor.
use std::path::Path;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Postgres;
use sqlx::migrate::Migrator;

use crate::repos::error::QueryResult;
use crate::repos::row::RowHandle;

/// A pooled connection provider.
///
/// Implementations must be cheap to clone (typically a pool handle inside).
#[async_trait]
pub trait Datasource: Clone + Send + Sync + 'static {
    type Session: Session;

    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Take a connection from the pool. Dropping the session gives it back.
    async fn acquire(&self) -> QueryResult<Self::Session>;
}

/// A connection scoped to a single operation.
#[async_trait]
pub trait Session: Send {
    type Row: RowHandle + Send;

    async fn fetch_all(&mut self, sql: &str) -> QueryResult<Vec<Self::Row>>;

    async fn fetch_optional(&mut self, sql: &str) -> QueryResult<Option<Self::Row>>;
}

/// PostgreSQL datasource backed by a `sqlx` pool.
#[derive(Clone, Debug)]
pub struct PgDatasource {
    pool: PgPool,
}

impl PgDatasource {
    pub async fn connect(options: PgConnectOptions, max_connections: u32) -> QueryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Apply pending migrations from `dir`. A missing directory is skipped.
    pub async fn migrate(&self, dir: &Path) -> anyhow::Result<()> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "migrations directory not found, skipping");
            return Ok(());
        }

        let migrator = Migrator::new(dir).await?;
        migrator.run(&self.pool).await?;
        tracing::info!(count = migrator.iter().count(), "migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Datasource for PgDatasource {
    type Session = PoolConnection<Postgres>;

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn acquire(&self) -> QueryResult<Self::Session> {
        Ok(self.pool.acquire().await?)
    }
}

#[async_trait]
impl Session for PoolConnection<Postgres> {
    type Row = PgRow;

    async fn fetch_all(&mut self, sql: &str) -> QueryResult<Vec<PgRow>> {
        Ok(sqlx::query(sql).fetch_all(&mut **self).await?)
    }

    async fn fetch_optional(&mut self, sql: &str) -> QueryResult<Option<PgRow>> {
        Ok(sqlx::query(sql).fetch_optional(&mut **self).await?)
    }
}
