use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;

/// Handle to the profile's dictionary database.
///
/// A single-connection pool backs the handle: schema mutations are
/// transactional but must be serialized by the caller, and search execution
/// holds the connection until it completes.
pub struct DictStore {
    pool: SqlitePool,
}

impl DictStore {
    /// Open (creating if missing) the dictionary database at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let store = Self::connect(options).await?;
        tracing::info!("dictionary database opened: {}", path.display());
        Ok(store)
    }

    /// In-memory database, used by tests.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let options = options
            .foreign_keys(true)
            .pragma("case_sensitive_like", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = DictStore { pool };
        store.init().await?;
        Ok(store)
    }

    /// Create the registry tables if they do not exist yet.
    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS languages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dictionary_registry (
                name TEXT UNIQUE NOT NULL,
                language_id INTEGER NOT NULL REFERENCES languages(id),
                fields TEXT,
                add_type TEXT,
                term_header TEXT,
                duplicate_header INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Compact the database file. Slow; runs outside any transaction and
    /// stalls other access to the same file, so keep it off interactive
    /// paths.
    pub async fn vacuum(&self) -> Result<(), StoreError> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
