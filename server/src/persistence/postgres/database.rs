//! Postgres connection pool and migration runner.

use std::collections::HashSet;
use std::path::Path;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::persistence::migrations::{self, LEDGER_TABLE};
use crate::persistence::PersistenceError;

/// Postgres implementation of the storage contract.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to `dsn` and apply pending scripts from `migrations_dir`.
    pub async fn connect(dsn: &str, migrations_dir: &Path) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new().max_connections(10).connect(dsn).await?;

        let store = Self { pool };
        store.run_migrations(migrations_dir).await?;
        Ok(store)
    }

    /// Apply every script in `dir` not yet recorded in the ledger and return
    /// the filenames applied by this call.
    pub async fn run_migrations(&self, dir: &Path) -> Result<Vec<String>, PersistenceError> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {LEDGER_TABLE} (
                filename   TEXT PRIMARY KEY,
                applied_at TIMESTAMPTZ NOT NULL
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
                "INSERT INTO {LEDGER_TABLE} (filename, applied_at) VALUES ($1, $2)"
            ))
            .bind(&script.filename)
            .bind(squash::model::now())
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;

            tracing::info!(backend = "postgres", file = %script.filename, "Migration applied");
            done.push(script.filename);
        }
        if done.is_empty() {
            tracing::debug!(backend = "postgres", "No pending migrations");
        }
        Ok(done)
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
