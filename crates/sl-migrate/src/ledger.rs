//! Applied-migration ledger.
//!
//! One row per change-script that has been fully applied, keyed by script
//! name. The ledger lives in the target database itself so every runner
//! pointed at the same database sees the same history.

use crate::error::{MigrateError, MigrateResult};
use sl_core::config::is_valid_table_name;
use sl_db::Database;

/// Default ledger table name
pub const DEFAULT_LEDGER_TABLE: &str = "drizzle_migrations";

/// A recorded script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Script name as recorded
    pub name: String,
    /// Timestamp the backend stamped on insert, as text
    pub applied_at: Option<String>,
}

/// Ledger table access over a database session
pub struct Ledger<'a> {
    db: &'a dyn Database,
    table: String,
}

impl<'a> Ledger<'a> {
    /// Ledger stored in `table` (`name` or `schema.name`)
    pub fn new(db: &'a dyn Database, table: impl Into<String>) -> MigrateResult<Self> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(MigrateError::Configuration(format!(
                "invalid ledger table name '{table}'"
            )));
        }
        Ok(Self { db, table })
    }

    /// Ledger in the default table
    pub fn with_default_table(db: &'a dyn Database) -> Self {
        Self {
            db,
            table: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }

    /// Table name as configured
    pub fn table(&self) -> &str {
        &self.table
    }

    fn schema_and_name(&self) -> (&str, &str) {
        match self.table.split_once('.') {
            Some((schema, name)) => (schema, name),
            None => (self.db.default_schema(), self.table.as_str()),
        }
    }

    /// Create the ledger table if it does not exist. Safe to call every run.
    pub async fn ensure_ledger(&self) -> MigrateResult<()> {
        for sql in self.create_statements() {
            self.db
                .execute(&sql)
                .await
                .map_err(|source| MigrateError::Ledger {
                    operation: format!("create of {}", self.table),
                    source,
                })?;
        }
        log::debug!("Ledger table {} ready", self.table);
        Ok(())
    }

    fn create_statements(&self) -> Vec<String> {
        let t = &self.table;
        let mut statements = Vec::new();
        if let Some((schema, _)) = t.split_once('.') {
            statements.push(format!("CREATE SCHEMA IF NOT EXISTS {schema}"));
        }
        match self.db.db_type() {
            "duckdb" => {
                statements.push(format!("CREATE SEQUENCE IF NOT EXISTS {t}_id_seq"));
                statements.push(format!(
                    "CREATE TABLE IF NOT EXISTS {t} (\
                     id INTEGER PRIMARY KEY DEFAULT nextval('{t}_id_seq'), \
                     hash TEXT NOT NULL UNIQUE, \
                     created_at TIMESTAMP DEFAULT current_timestamp)"
                ));
            }
            _ => statements.push(format!(
                "CREATE TABLE IF NOT EXISTS {t} (\
                 id SERIAL PRIMARY KEY, \
                 hash TEXT NOT NULL UNIQUE, \
                 created_at TIMESTAMPTZ DEFAULT NOW())"
            )),
        }
        statements
    }

    /// Whether the ledger table exists yet, without creating it
    pub async fn exists(&self) -> MigrateResult<bool> {
        let (schema, name) = self.schema_and_name();
        let rows = self
            .db
            .query_rows(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_name = $2",
                &[schema, name],
            )
            .await
            .map_err(|source| MigrateError::Ledger {
                operation: "lookup".to_string(),
                source,
            })?;
        Ok(!rows.is_empty())
    }

    /// Whether `name` has been recorded
    pub async fn is_applied(&self, name: &str) -> MigrateResult<bool> {
        let sql = format!("SELECT id::text FROM {} WHERE hash = $1", self.table);
        let rows = self
            .db
            .query_rows(&sql, &[name])
            .await
            .map_err(|source| MigrateError::Ledger {
                operation: format!("read of {name}"),
                source,
            })?;
        Ok(!rows.is_empty())
    }

    /// Record `name` as fully applied.
    ///
    /// A script is recorded at most once; a second insert means two runners
    /// raced or the ledger was edited by hand, and is reported as an
    /// invariant violation.
    pub async fn record_applied(&self, name: &str) -> MigrateResult<()> {
        let sql = format!("INSERT INTO {} (hash) VALUES ($1)", self.table);
        match self.db.execute_with(&sql, &[name]).await {
            Ok(_) => {
                log::debug!("Recorded {name} in {}", self.table);
                Ok(())
            }
            Err(e) if e.is_unique_violation() => Err(MigrateError::InvariantViolation(format!(
                "'{name}' is already recorded in {}; is another runner active?",
                self.table
            ))),
            Err(source) => Err(MigrateError::Ledger {
                operation: format!("write of {name}"),
                source,
            }),
        }
    }

    /// Every recorded script, in insertion order
    pub async fn applied_entries(&self) -> MigrateResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT hash, created_at::text FROM {} ORDER BY id",
            self.table
        );
        let rows = self
            .db
            .query_rows(&sql, &[])
            .await
            .map_err(|source| MigrateError::Ledger {
                operation: "scan".to_string(),
                source,
            })?;

        Ok(rows
            .into_iter()
            .filter_map(|mut row| {
                let applied_at = row.get_mut(1).and_then(Option::take);
                let name = row.into_iter().next().flatten()?;
                Some(LedgerEntry { name, applied_at })
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
