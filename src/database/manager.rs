use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool manager for the archive database. The pool is created
/// lazily from DATABASE_URL on first use and shared process-wide.
pub struct DatabaseManager {
    pool: Mutex<Option<PgPool>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: Mutex::new(None),
        })
    }

    /// Get the shared database pool, creating it on first call
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();
        let mut guard = manager.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        let connection_string = Self::build_connection_string()?;
        let db_config = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connect_timeout_secs))
            .connect(&connection_string)
            .await?;

        *guard = Some(pool.clone());
        info!("Created database pool");
        Ok(pool)
    }

    /// Build the connection string from DATABASE_URL, optionally swapping the
    /// database name in the URL path when ARKIV_DATABASE_NAME is set (keeps a
    /// single base URL across environments).
    fn build_connection_string() -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        match std::env::var("ARKIV_DATABASE_NAME") {
            Ok(name) if !name.is_empty() => {
                if !Self::is_valid_db_name(&name) {
                    return Err(DatabaseError::InvalidDatabaseUrl);
                }
                let mut url =
                    url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                // Replace the path with the database name (ensure leading slash)
                url.set_path(&format!("/{}", name));
                Ok(url.to_string())
            }
            _ => Ok(base),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::migrate!().run(&pool).await?;
        info!("Migrations applied");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        let manager = Self::instance();
        let mut guard = manager.pool.lock().await;
        if let Some(pool) = guard.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }

    /// Validate database names to prevent injection: [a-zA-Z0-9_]+ only
    fn is_valid_db_name(name: &str) -> bool {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_db_names() {
        assert!(DatabaseManager::is_valid_db_name("arkiv"));
        assert!(DatabaseManager::is_valid_db_name("arkiv_test_01"));
        assert!(!DatabaseManager::is_valid_db_name(""));
        assert!(!DatabaseManager::is_valid_db_name("arkiv-test"));
        assert!(!DatabaseManager::is_valid_db_name("arkiv; DROP DATABASE"));
    }
}
