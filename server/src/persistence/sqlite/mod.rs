//! SQLite-backed implementation of the storage contract.
//!
//! ## Database setup
//!
//! [`SqliteStore`] wraps a `sqlx::SqlitePool` configured with:
//! - **WAL mode**: one writer and multiple concurrent readers.
//! - **Foreign keys enabled** at the connection level.
//! - **Migration bootstrap**: [`SqliteStore::open`] applies pending scripts
//!   from the configured directory, each in its own transaction together
//!   with its `schema_migrations` row.
//!
//! ## Repositories
//!
//! One file per aggregate, each implementing the matching trait from
//! [`crate::persistence::traits`] for `SqliteStore`. Rows are decoded through
//! [`crate::persistence::codec`], shared with the Postgres backend.

mod database;
mod friendly_repo;
mod join_request_repo;
mod league_repo;
mod match_repo;
mod report_repo;
mod user_repo;

pub use database::SqliteStore;
