use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::{EntityStore, StoreError};

/// Builds the PostgreSQL pool and provisions the schema the store expects
pub struct DatabaseManager;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS projects (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        owner_id UUID NOT NULL,
        member_ids UUID[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL,
        priority TEXT NOT NULL,
        due_date TIMESTAMPTZ,
        project_id UUID NOT NULL,
        assigned_to UUID,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_user_id ON users (user_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_email ON users (lower(email))",
    "CREATE INDEX IF NOT EXISTS idx_user_role ON users (role)",
    "CREATE INDEX IF NOT EXISTS idx_project_owner ON projects (owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_project_members ON projects USING GIN (member_ids)",
    "CREATE INDEX IF NOT EXISTS idx_task_project ON tasks (project_id)",
    "CREATE INDEX IF NOT EXISTS idx_task_assigned ON tasks (assigned_to)",
    "CREATE INDEX IF NOT EXISTS idx_task_status ON tasks (status)",
];

impl DatabaseManager {
    /// Build the configured store backend. PostgreSQL stores get their
    /// schema ensured before first use.
    pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn EntityStore>, StoreError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store; data is lost on shutdown");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::connect(config).await?;
                Self::ensure_schema(&pool).await?;
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Open a pool against the configured database
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        let shown = Self::redacted_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", shown);
        Ok(pool)
    }

    /// Create tables and indexes when missing. Safe to run repeatedly.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Database schema and indexes ensured");
        Ok(())
    }

    /// Connection string with the password removed, for logs
    fn redacted_url(raw: &str) -> Result<String, StoreError> {
        let mut url = url::Url::parse(raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("****"))
                .map_err(|_| StoreError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
