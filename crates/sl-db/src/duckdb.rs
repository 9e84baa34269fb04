//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Row};
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn execute_with_sync(&self, sql: &str, params: &[&str]) -> DbResult<u64> {
        let conn = self.lock()?;
        let affected = conn.execute(sql, duckdb::params_from_iter(params.iter()))?;
        Ok(affected as u64)
    }

    /// DuckDB panics on `column_count()` before execution, so the count is
    /// read per row from the executed statement.
    fn query_rows_sync(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(duckdb::params_from_iter(params.iter()), |row| {
                let column_count = row.as_ref().column_count();
                (0..column_count)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<Result<Row, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        self.execute_sync(sql)
    }

    async fn execute_with(&self, sql: &str, params: &[&str]) -> DbResult<u64> {
        self.execute_with_sync(sql, params)
    }

    async fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>> {
        self.query_rows_sync(sql, params)
    }

    fn default_schema(&self) -> &'static str {
        "main"
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    async fn close(&self) -> DbResult<()> {
        // The connection closes on drop; flush the WAL now so a file-backed
        // database is complete before the process exits.
        self.execute_sync("CHECKPOINT")
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
