//! # Connection Pool
//!
//! Opens the SQLite file, applies migrations and hands out repositories.
//!
//! ## Writers and readers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reports, listings ──► any pooled connection (WAL snapshot, no lock)    │
//! │                                                                         │
//! │  create / update / assign_code                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  begin_write(): BEGIN IMMEDIATE ── takes the write lock up front        │
//! │       │           (others wait up to busy_timeout, then retry inside    │
//! │       │            SQLite; no stale-snapshot upgrade can fail)          │
//! │       ▼                                                                 │
//! │  read material → INSERT → bump counter → COMMIT                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A deferred `BEGIN` that reads first and writes later cannot upgrade its
//! snapshot once another writer committed; SQLite reports `SQLITE_BUSY`
//! immediately without honouring the busy timeout. Multi-statement writes
//! therefore always go through [`begin_write`].

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::material::MaterialRepository;
use crate::repository::product::ProductRepository;
use crate::repository::report::ReportRepository;
use crate::repository::withdrawal::WithdrawalRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how many connections may touch it.
///
/// ```rust,ignore
/// let config = DbConfig::new("/srv/veta/veta.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first use. `:memory:` for tests.
    pub database_path: PathBuf,

    /// Pool size. Default 5; in-memory databases are pinned to 1 so every
    /// query sees the same database.
    pub max_connections: u32,

    /// How long a writer waits for the write lock. Default 10 s.
    pub busy_timeout: Duration,

    /// How long a request waits for a free pooled connection. Default 30 s.
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(10),
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// Private single-connection database, used by tests.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(IN_MEMORY)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared database handle; cloning it clones the pool handle only.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let max_connections = if config.is_in_memory() {
            1
        } else {
            config.max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Pool ready"
        );

        migrations::run_migrations(&pool).await?;
        info!("Schema up to date");

        Ok(Database { pool })
    }

    /// Raw pool, for migration status and ad-hoc queries in tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn materials(&self) -> MaterialRepository {
        MaterialRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Withdrawals, including code assignment.
    pub fn withdrawals(&self) -> WithdrawalRepository {
        WithdrawalRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// `true` when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

/// Starts a transaction that holds the write lock from its first statement.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let (total, applied) = crate::migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_health_check_fails_after_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_pins_single_connection() {
        let config = DbConfig::in_memory().max_connections(8);
        let db = Database::new(config).await.unwrap();

        assert_eq!(db.pool().options().get_max_connections(), 1);
    }

    #[tokio::test]
    async fn test_write_transaction_holds_lock() {
        let path = std::env::temp_dir().join(format!("veta-lock-{}.db", std::process::id()));
        std::fs::remove_file(&path).ok();
        let db = Database::new(
            DbConfig::new(&path)
                .max_connections(2)
                .busy_timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap();

        let tx = begin_write(db.pool()).await.unwrap();
        // A second writer cannot start while the first holds the lock
        assert!(begin_write(db.pool()).await.is_err());
        tx.commit().await.unwrap();
        assert!(begin_write(db.pool()).await.is_ok());

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            std::fs::remove_file(format!("{}{suffix}", path.display())).ok();
        }
    }
}
