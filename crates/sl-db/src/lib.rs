//! sl-db - Database abstraction layer for Sluice
//!
//! This crate provides the `Database` trait the migration runner executes
//! against, a Postgres implementation (sqlx) and a DuckDB implementation,
//! and the error classifier that separates idempotency collisions from
//! fatal statement failures.

pub mod classify;
pub mod connect;
pub mod duckdb;
pub mod error;
pub mod postgres;
pub mod sqlstate;
pub mod traits;

pub use classify::{Classification, ErrorClassifier};
pub use connect::{connect, BackendKind, ConnectOptions};
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use postgres::PgBackend;
pub use traits::{Database, Row};
