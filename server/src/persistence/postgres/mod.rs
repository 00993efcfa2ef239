//! Postgres-backed implementation of the storage contract.
//!
//! Same schema shape and column codec as the SQLite backend; timestamps use
//! `TIMESTAMPTZ` and placeholders are numbered. [`PostgresStore::connect`]
//! runs the migration bootstrap before returning.

mod database;
mod friendly_repo;
mod join_request_repo;
mod league_repo;
mod match_repo;
mod report_repo;
mod user_repo;

pub use database::PostgresStore;
