//! Storage contract and its three backends.
//!
//! | Backend | Type | Notes |
//! |---------|------|-------|
//! | in-memory | [`MemoryStore`] | one `RwLock` over all tables, optional seed data |
//! | SQLite | [`SqliteStore`] | file database, WAL, migration bootstrap on open |
//! | Postgres | [`PostgresStore`] | networked database, migration bootstrap on connect |
//!
//! All three implement the repository traits in [`traits`] and are wrapped by
//! [`AnyStore`] for callers that pick the backend at runtime via
//! [`open_store`].

mod any_store;
pub(crate) mod codec;
pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
mod conformance;

pub use any_store::AnyStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use traits::{
    FriendlyMatchRepository, JoinRequestRepository, LeagueRepository, MatchRepository,
    ReportRepository, Store, UserRepository,
};

use squash::{MembershipError, NewEntityError};

use crate::config::BackendConfig;

/// Coarse error classes used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Forbidden,
    Conflict,
}

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{entity} already exists: {id}")]
    DuplicateId { entity: &'static str, id: String },
    #[error("email already exists: {0}")]
    DuplicateEmail(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration {file} failed: {source}")]
    Migration {
        file: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected value {value:?} in column {column}")]
    Corrupt { column: &'static str, value: String },
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl PersistenceError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn duplicate_id(entity: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateEmail(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateId { .. }
            | Self::Database(_)
            | Self::Migration { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Corrupt { .. }
            | Self::PasswordHash(_) => ErrorKind::Conflict,
        }
    }
}

impl From<NewEntityError> for PersistenceError {
    fn from(err: NewEntityError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<MembershipError> for PersistenceError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::NotAnAdmin(user_id) => Self::not_found("league admin", user_id),
            MembershipError::OwnerRole => Self::Validation(MembershipError::OwnerRole.to_string()),
        }
    }
}

/// Open the backend described by `config`, applying pending migrations for
/// the SQL backends. Any error here means the store must not be used.
pub async fn open_store(config: &BackendConfig) -> Result<AnyStore, PersistenceError> {
    match config {
        BackendConfig::Postgres {
            dsn,
            migrations_dir,
        } => {
            let store = PostgresStore::connect(dsn, migrations_dir).await?;
            tracing::info!(backend = "postgres", "Store opened");
            Ok(AnyStore::Postgres(store))
        }
        BackendConfig::Sqlite {
            path,
            migrations_dir,
        } => {
            let store = SqliteStore::open(path, migrations_dir).await?;
            tracing::info!(backend = "sqlite", path = %path.display(), "Store opened");
            Ok(AnyStore::Sqlite(store))
        }
        BackendConfig::Memory { seed } => {
            let store = if *seed {
                MemoryStore::seeded()?
            } else {
                MemoryStore::new()
            };
            tracing::info!(backend = "memory", seeded = *seed, "Store opened");
            Ok(AnyStore::Memory(store))
        }
    }
}
