//! # SQLite Unit Store
//!
//! Connection pool creation and the `units` table.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Unit Store                                  │
//! │                                                                         │
//! │  SqliteConfig::new(path) ← Configure pool settings                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::new(config).await ← Create pool + run migrations         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  units                                  │                           │
//! │  │  unit_id | status | holder | ... | location                         │
//! │  │  1       | available   | NULL  | ... | NULL                         │
//! │  │  2       | checked_out | Alice | ... | Room 101                     │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  save(): BEGIN → DELETE all → INSERT every row → COMMIT                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL journal mode keeps readers from blocking the single writer and gives
//! better crash recovery.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use hostel_core::UnitRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::UnitStore;
use crate::error::{StoreError, StoreResult};
use crate::migrations;

// =============================================================================
// Configuration
// =============================================================================

/// SQLite store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SqliteConfig::new("/path/to/units.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections
    /// forever (required for in-memory databases).
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl SqliteConfig {
    /// Creates a new configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// A single connection that never idles out, because every new
    /// connection to `:memory:` would see an empty database.
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Store
// =============================================================================

/// Unit store backed by a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and runs migrations.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Enables WAL mode and NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: SqliteConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing unit database"
        );

        let connect_url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Unit database pool created"
        );

        let store = SqliteStore { pool };

        if config.run_migrations {
            store.run_migrations().await?;
        }

        Ok(store)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool. Later calls will fail.
    pub async fn close(&self) {
        info!("Closing unit database pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl UnitStore for SqliteStore {
    async fn load(&self) -> StoreResult<Option<Vec<UnitRecord>>> {
        let records = sqlx::query_as::<_, UnitRecord>(
            r#"
            SELECT
                unit_id,
                status,
                holder,
                checked_out_at,
                due_at,
                location
            FROM units
            ORDER BY unit_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Loaded units from database");

        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(records))
    }

    async fn save(&self, records: &[UnitRecord]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        // The table mirrors `records` exactly: rows for units not in the set go
        let removed = sqlx::query("DELETE FROM units")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO units (
                    unit_id, status, holder, checked_out_at, due_at, location
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(record.unit_id)
            .bind(record.status)
            .bind(&record.holder)
            .bind(record.checked_out_at)
            .bind(record.due_at)
            .bind(&record.location)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(count = records.len(), replaced = removed, "Units saved to database");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use hostel_core::ledger::provision;
    use hostel_core::{Unit, UnitStatus};

    #[tokio::test]
    async fn test_in_memory_database() {
        let store = SqliteStore::new(SqliteConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = SqliteConfig::new("/tmp/units.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_holds() {
        let store = SqliteStore::new(SqliteConfig::in_memory()).await.unwrap();

        let mut units = provision(3);
        units[2] = units[2]
            .check_out("Alice", "Room 101", ChronoDuration::hours(2), Utc::now())
            .unwrap();
        let records: Vec<UnitRecord> = units.iter().map(UnitRecord::from).collect();
        store.save(&records).await.unwrap();

        // Release and save again: the row is updated, not duplicated
        units[2] = units[2].release().unwrap();
        let records: Vec<UnitRecord> = units.iter().map(UnitRecord::from).collect();
        store.save(&records).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded.iter().all(|r| r.status == UnitStatus::Available));
        assert_eq!(Unit::try_from(loaded[2].clone()).unwrap(), Unit::available(3));
    }

    #[tokio::test]
    async fn test_save_replaces_whole_set() {
        let store = SqliteStore::new(SqliteConfig::in_memory()).await.unwrap();

        let mut units = provision(5);
        units[4] = units[4]
            .check_out("Eve", "Room 5", ChronoDuration::hours(1), Utc::now())
            .unwrap();
        let records: Vec<UnitRecord> = units.iter().map(UnitRecord::from).collect();
        store.save(&records).await.unwrap();

        let smaller: Vec<UnitRecord> = provision(3).iter().map(UnitRecord::from).collect();
        store.save(&smaller).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, smaller);
        assert!(loaded.iter().all(|r| r.holder.is_none()));
    }

    #[tokio::test]
    async fn test_file_database_persists_across_pools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.db");
        let now = Utc::now();

        {
            let store = SqliteStore::new(SqliteConfig::new(&path)).await.unwrap();
            let mut units = provision(2);
            units[0] = units[0]
                .check_out("Bob", "Laundry", ChronoDuration::hours(1), now)
                .unwrap();
            let records: Vec<UnitRecord> = units.iter().map(UnitRecord::from).collect();
            store.save(&records).await.unwrap();
            store.close().await;
        }

        let store = SqliteStore::new(SqliteConfig::new(&path)).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        let unit = Unit::try_from(loaded[0].clone()).unwrap();
        let hold = unit.hold().unwrap();
        assert_eq!(hold.holder(), "Bob");
        assert_eq!(hold.duration(), ChronoDuration::hours(1));
    }
}
