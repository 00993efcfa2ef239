//! Backend selection for the squash server.
//!
//! The caller fills [`BackendSettings`] (the CLI does so from flags and
//! environment variables) and [`BackendConfig::resolve`] picks one backend
//! with the following precedence:
//! 1. a non-blank Postgres DSN
//! 2. a non-blank SQLite database path
//! 3. the in-memory store, seeded with demo data unless running in production

use std::path::{Path, PathBuf};

/// Migration scripts shipped with the crate, one directory per SQL dialect.
pub fn default_postgres_migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations/postgres")
}

pub fn default_sqlite_migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations/sqlite")
}

/// Raw, possibly blank, selection inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSettings {
    pub postgres_dsn: Option<String>,
    pub postgres_migrations_dir: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
    pub sqlite_migrations_dir: Option<PathBuf>,
    /// Disables seed data for the in-memory store.
    pub production: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Postgres {
        dsn: String,
        migrations_dir: PathBuf,
    },
    Sqlite {
        path: PathBuf,
        migrations_dir: PathBuf,
    },
    Memory {
        seed: bool,
    },
}

impl BackendConfig {
    pub fn resolve(settings: &BackendSettings) -> Self {
        if let Some(dsn) = non_blank(settings.postgres_dsn.as_deref()) {
            return Self::Postgres {
                dsn: dsn.to_string(),
                migrations_dir: dir_or(
                    settings.postgres_migrations_dir.as_deref(),
                    default_postgres_migrations_dir,
                ),
            };
        }

        if let Some(path) = settings
            .sqlite_path
            .as_deref()
            .filter(|p| non_blank(p.to_str()).is_some())
        {
            return Self::Sqlite {
                path: path.to_path_buf(),
                migrations_dir: dir_or(
                    settings.sqlite_migrations_dir.as_deref(),
                    default_sqlite_migrations_dir,
                ),
            };
        }

        Self::Memory {
            seed: !settings.production,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Sqlite { .. } => "sqlite",
            Self::Memory { .. } => "memory",
        }
    }
}

/// `APP=prod` marks a production deployment.
pub fn is_production(app: Option<&str>) -> bool {
    app.is_some_and(|v| v.trim().eq_ignore_ascii_case("prod"))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn dir_or(dir: Option<&Path>, default: fn() -> PathBuf) -> PathBuf {
    match dir {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => default(),
    }
}
