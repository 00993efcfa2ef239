//! SQLite connection pool and migration runner.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::persistence::migrations::{self, LEDGER_TABLE};
use crate::persistence::PersistenceError;

/// SQLite implementation of the storage contract.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply pending scripts
    /// from `migrations_dir`.
    pub async fn open(path: &Path, migrations_dir: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations(migrations_dir).await?;
        Ok(store)
    }

    /// Create an in-memory database for testing, migrated with the bundled
    /// scripts.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store
            .run_migrations(&crate::config::default_sqlite_migrations_dir())
            .await?;
        Ok(store)
    }

    /// Apply every script in `dir` not yet recorded in the ledger and return
    /// the filenames applied by this call.
    pub async fn run_migrations(&self, dir: &Path) -> Result<Vec<String>, PersistenceError> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {LEDGER_TABLE} (
                filename   TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            )"
        ))
        .execute(&self.pool)
        .await?;

        let applied: Vec<(String,)> =
            sqlx::query_as(&format!("SELECT filename FROM {LEDGER_TABLE}"))
                .fetch_all(&self.pool)
                .await?;
        let applied: HashSet<String> = applied.into_iter().map(|(f,)| f).collect();

        let mut done = Vec::new();
        for script in migrations::pending(migrations::discover(dir)?, &applied) {
            let mut tx = self.pool.begin().await?;
            if !script.is_blank() {
                sqlx::raw_sql(&script.sql)
                    .execute(&mut *tx)
                    .await
                    .map_err(|source| PersistenceError::Migration {
                        file: script.filename.clone(),
                        source,
                    })?;
            }
            sqlx::query(&format!(
                "INSERT INTO {LEDGER_TABLE} (filename, applied_at) VALUES (?, ?)"
            ))
            .bind(&script.filename)
            .bind(squash::model::now())
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;

            tracing::info!(backend = "sqlite", file = %script.filename, "Migration applied");
            done.push(script.filename);
        }
        if done.is_empty() {
            tracing::debug!(backend = "sqlite", "No pending migrations");
        }
        Ok(done)
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
