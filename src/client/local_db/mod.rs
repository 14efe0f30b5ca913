//! # Local Database Module
//!
//! Durable client-side storage for offline practice. Two logical
//! collections live in one SQLite file:
//!
//! - **Cached sets** (`cached_sets`): one frozen study set snapshot per
//!   `set_id`, replaced wholesale on re-download
//! - **Pending attempts** (`pending_attempts`): practice results keyed by an
//!   auto-assigned `local_id`, indexed by user, set and sync state
//!
//! ## Key Components
//!
//! - `LocalStore`: connection pool, schema setup and statistics
//! - `StoreCell`: lazily opens one store and hands the same handle to every caller
//! - `schema.rs`: table layout and migration versions
//! - `cached_sets.rs`: snapshot reads and writes
//! - `attempts.rs`: attempt queue operations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studycache::client::local_db::LocalStore;
//!
//! # async fn example() -> Result<(), studycache::shared::StorageError> {
//! let store = LocalStore::open("/tmp/studycache/offline.db").await?;
//! let downloaded = store.list_cached_sets().await?;
//! let pending = store.count_pending().await?;
//! println!("{} sets cached, {} attempts waiting", downloaded.len(), pending);
//! # Ok(())
//! # }
//! ```

pub mod attempts;
pub mod cached_sets;
pub mod schema;

pub use attempts::AttemptFilter;

use crate::shared::error::StorageError;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Result type for local database operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Local database connection manager
///
/// Cheap to clone; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open or create the store at `path`
    ///
    /// Creates the parent directory and the database file if needed, then
    /// makes sure every table and index exists. Safe to call on an
    /// already-initialised file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        tracing::info!(path = %path.display(), "Opened local store");
        Self::from_pool(pool).await
    }

    /// Open a store that lives only as long as this handle and its clones
    ///
    /// Uses a single connection so every clone sees the same database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened in-memory local store");
        Self::from_pool(pool).await
    }

    /// Open the store at the platform default location
    pub async fn open_default() -> Result<Self> {
        Self::open(Self::default_path()).await
    }

    /// Get database file path
    ///
    /// Returns the platform-specific path for the local database file.
    /// Uses the system's data directory when available.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("studycache");
        path.push("offline.db");
        path
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize database schema
    ///
    /// Creates all necessary tables and runs any pending migrations.
    async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(schema::SCHEMA_SQL).execute(&self.pool).await?;
        self.run_migrations().await
    }

    /// Run database migrations
    ///
    /// Checks the current schema version and applies any pending migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version: (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if !schema::needs_migration(current_version.0) {
            return Ok(());
        }

        for version in schema::get_pending_migrations(current_version.0) {
            // Version 1 is the base schema created above; later versions add
            // their statements here before being recorded.
            sqlx::query("INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
            tracing::info!(version, "Applied local store migration");
        }

        Ok(())
    }

    /// Current schema version recorded in the store
    pub async fn schema_version(&self) -> Result<i64> {
        let version: (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;
        Ok(version.0)
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database statistics
    ///
    /// Returns row counts per collection, for diagnostics and the pending
    /// sync indicator.
    pub async fn stats(&self) -> Result<StoreStats> {
        let cached_sets: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cached_sets")
            .fetch_one(&self.pool)
            .await?;

        let by_state: Vec<(String, i64)> = sqlx::query_as(
            "SELECT sync_state, COUNT(*) FROM pending_attempts GROUP BY sync_state",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stats = StoreStats {
            cached_sets: cached_sets.0 as u64,
            ..StoreStats::default()
        };
        for (state, count) in by_state {
            match state.as_str() {
                "pending" => stats.pending_attempts = count as u64,
                "synced" => stats.synced_attempts = count as u64,
                other => tracing::warn!(state = other, "Unknown sync state in local store"),
            }
        }
        Ok(stats)
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of downloaded study sets
    pub cached_sets: u64,
    /// Attempts waiting to be transmitted
    pub pending_attempts: u64,
    /// Attempts accepted by the backend but not yet purged
    pub synced_attempts: u64,
}

/// Where a [`StoreCell`] opens its store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl From<Option<PathBuf>> for StoreLocation {
    fn from(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => StoreLocation::File(path),
            None => StoreLocation::Memory,
        }
    }
}

impl StoreLocation {
    /// Open a fresh store here; every call makes a new pool
    pub async fn open(&self) -> Result<LocalStore> {
        match self {
            StoreLocation::File(path) => LocalStore::open(path).await,
            StoreLocation::Memory => LocalStore::in_memory().await,
        }
    }
}

/// Opens the store once and shares the handle
///
/// The first `get` initialises the store; concurrent callers wait for that
/// same initialisation instead of opening a second pool. A failed open is not
/// cached, so the next `get` tries again.
#[derive(Debug)]
pub struct StoreCell {
    location: StoreLocation,
    store: OnceCell<LocalStore>,
}

impl StoreCell {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            store: OnceCell::new(),
        }
    }

    /// Get the shared store, opening it on first use
    pub async fn get(&self) -> Result<&LocalStore> {
        self.store.get_or_try_init(|| self.location.open()).await
    }

    /// Whether the store has been opened
    pub fn is_open(&self) -> bool {
        self.store.initialized()
    }
}
