//! Migration script discovery for the SQL backends.
//!
//! Scripts are the `*.sql` files of one directory, applied in lexical
//! filename order. Each backend keeps a `schema_migrations` ledger keyed by
//! filename; a script runs inside the same transaction as its ledger insert,
//! so either both are visible or neither is. Script contents are not hashed:
//! editing an applied script has no effect.

use std::collections::HashSet;
use std::path::Path;

use super::PersistenceError;

pub const LEDGER_TABLE: &str = "schema_migrations";

/// One script read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    pub filename: String,
    pub sql: String,
}

impl MigrationScript {
    /// Whitespace-only scripts are recorded in the ledger without running.
    pub fn is_blank(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// Read every `*.sql` file in `dir`, sorted by filename.
/// A missing directory yields no scripts.
pub fn discover(dir: &Path) -> Result<Vec<MigrationScript>, PersistenceError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(dir = %dir.display(), "Migrations directory not found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut scripts = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !filename.ends_with(".sql") {
            continue;
        }
        let sql = std::fs::read_to_string(entry.path())?;
        scripts.push(MigrationScript { filename, sql });
    }
    scripts.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(scripts)
}

/// Scripts whose filename is not yet in the ledger, in application order.
pub fn pending(scripts: Vec<MigrationScript>, applied: &HashSet<String>) -> Vec<MigrationScript> {
    scripts
        .into_iter()
        .filter(|s| !applied.contains(&s.filename))
        .collect()
}
