//! Storage, services and configuration for the squash league server.
//!
//! Domain rules live in the [`squash`] crate; this crate persists them and
//! applies permission checks on top.

pub mod config;
pub mod persistence;
pub mod service;
