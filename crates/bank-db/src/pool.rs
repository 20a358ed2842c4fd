//! # Opening the Card Database
//!
//! [`DbConfig`] says where the cards live, [`Database`] owns the sqlx pool
//! and hands out repositories.
//!
//! ```text
//!   DbConfig::new("card.s3db") ─┐
//!                               ├─► Database::new ─► migrate ─► db.cards()
//!   DbConfig::in_memory() ──────┘
//! ```
//!
//! On-disk databases run in WAL mode with NORMAL synchronous writes. An
//! in-memory database lives on a single connection that is never recycled,
//! because every new `:memory:` connection starts out empty.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::card::CardRepository;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Memory,
}

/// Database settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/bank/card.s3db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: Location,

    /// Upper bound on pooled connections. Forced to 1 in memory.
    pub max_connections: u32,

    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,

    /// Apply pending migrations on open.
    pub migrate: bool,
}

impl DbConfig {
    /// A file-backed database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: Location::File(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            migrate: true,
        }
    }

    /// A throwaway database, mostly for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            location: Location::Memory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.location == Location::Memory
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        match &self.location {
            Location::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string())),
            Location::File(path) => Ok(SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)),
        }
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new().acquire_timeout(self.acquire_timeout);
        match self.location {
            Location::Memory => options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
            Location::File(_) => options
                .max_connections(self.max_connections)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(30 * 60)),
        }
    }
}

/// Open card database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects, then migrates unless the config says otherwise.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, "Opening card database");

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.migrate {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Card repository sharing this pool.
    pub fn cards(&self) -> CardRepository {
        CardRepository::new(self.pool.clone())
    }

    /// Closes every connection. Repositories handed out earlier stop working.
    pub async fn close(&self) {
        info!("Closing card database");
        self.pool.close().await;
    }

    /// True when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_skip_migrations() {
        let db = Database::new(DbConfig::in_memory().migrate(false)).await.unwrap();
        let (_, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(applied, 0);
    }

    #[test]
    fn test_file_config() {
        let config = DbConfig::new("/tmp/card.s3db").max_connections(2);
        assert_eq!(config.location, Location::File(PathBuf::from("/tmp/card.s3db")));
        assert_eq!(config.max_connections, 2);
        assert!(config.migrate);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }
}
