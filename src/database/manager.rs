use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use super::connection::DatabaseConnectionInfo;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Only MySQL/MariaDB connections are supported.")]
    UnsupportedEngine,

    #[error("Database is not configured: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the connection pool for the primary database. The pool connects
/// lazily, so the service starts even when the database is down.
pub struct DatabaseManager {
    info: Option<DatabaseConnectionInfo>,
    unavailable_reason: String,
    pool: Option<MySqlPool>,
}

impl DatabaseManager {
    pub fn new(info: Option<DatabaseConnectionInfo>, unavailable_reason: Option<String>, max_connections: u32) -> Self {
        let pool = info.as_ref().map(|info| {
            MySqlPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect_lazy_with(info.connect_options())
        });

        if let Some(info) = &info {
            info!("Configured database pool for: {}@{}:{}/{}", info.username, info.host, info.port, info.database);
        }

        Self {
            info,
            unavailable_reason: unavailable_reason.unwrap_or_else(|| "DATABASE_URL is not set".to_string()),
            pool,
        }
    }

    pub fn pool(&self) -> Result<&MySqlPool, DatabaseError> {
        self.pool
            .as_ref()
            .ok_or_else(|| DatabaseError::Unavailable(self.unavailable_reason.clone()))
    }

    pub fn info(&self) -> Result<&DatabaseConnectionInfo, DatabaseError> {
        self.info
            .as_ref()
            .ok_or_else(|| DatabaseError::Unavailable(self.unavailable_reason.clone()))
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.pool()?;
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("Closed database pool");
        }
    }

    /// Quote a MySQL identifier with backticks
    pub fn quote_identifier(name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }
}
