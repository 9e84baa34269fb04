//! Recording fake database for runner tests

use async_trait::async_trait;
use sl_db::{Database, DbError, DbResult, Row};
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`Database`] that records every call and understands just enough of the
/// ledger SQL to behave like a real table.
///
/// Statements not aimed at the ledger succeed unless a failure was scripted
/// for them with [`fail_on`](Self::fail_on).
#[derive(Default)]
pub(crate) struct RecordingDb {
    calls: Mutex<Vec<String>>,
    ledger: Mutex<Option<Vec<String>>>,
    failures: Mutex<HashMap<String, (String, usize)>>,
}

impl RecordingDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` executions of `statement` with condition `code`
    pub fn fail_on(&self, statement: &str, code: &str, times: usize) {
        self.failures
            .lock()
            .unwrap()
            .insert(statement.to_string(), (code.to_string(), times));
    }

    /// Non-ledger statements executed, in order, including failed ones
    pub fn executed(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded script names, in order
    pub fn recorded(&self) -> Vec<String> {
        self.ledger.lock().unwrap().clone().unwrap_or_default()
    }

    /// Pre-populate the ledger
    pub fn seed_ledger(&self, names: &[&str]) {
        *self.ledger.lock().unwrap() = Some(names.iter().map(|n| n.to_string()).collect());
    }

    fn is_ledger_sql(sql: &str) -> bool {
        sql.contains("drizzle_migrations") || sql.contains("information_schema")
    }

    fn no_ledger() -> DbError {
        DbError::execution("42P01", "relation \"drizzle_migrations\" does not exist")
    }
}

#[async_trait]
impl Database for RecordingDb {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        if Self::is_ledger_sql(sql) {
            let mut ledger = self.ledger.lock().unwrap();
            if ledger.is_none() {
                *ledger = Some(Vec::new());
            }
            return Ok(());
        }

        self.calls.lock().unwrap().push(sql.to_string());
        let mut failures = self.failures.lock().unwrap();
        if let Some((code, remaining)) = failures.get_mut(sql) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DbError::execution(code.clone(), format!("scripted failure: {sql}")));
            }
        }
        Ok(())
    }

    async fn execute_with(&self, sql: &str, params: &[&str]) -> DbResult<u64> {
        assert!(sql.starts_with("INSERT INTO drizzle_migrations"), "{sql}");
        let mut ledger = self.ledger.lock().unwrap();
        let entries = ledger.as_mut().ok_or_else(Self::no_ledger)?;
        let name = params[0].to_string();
        if entries.contains(&name) {
            return Err(DbError::execution("23505", "duplicate key value"));
        }
        entries.push(name);
        Ok(1)
    }

    async fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>> {
        let ledger = self.ledger.lock().unwrap();
        if sql.contains("information_schema") {
            return Ok(match *ledger {
                Some(_) => vec![vec![Some("drizzle_migrations".to_string())]],
                None => Vec::new(),
            });
        }
        let entries = ledger.as_ref().ok_or_else(Self::no_ledger)?;
        if sql.contains("WHERE hash = $1") {
            return Ok(entries
                .iter()
                .enumerate()
                .filter(|(_, name)| name.as_str() == params[0])
                .map(|(i, _)| vec![Some((i + 1).to_string())])
                .collect());
        }
        Ok(entries
            .iter()
            .map(|name| vec![Some(name.clone()), Some("2026-01-01 00:00:00+00".to_string())])
            .collect())
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }

    fn db_type(&self) -> &'static str {
        "fake"
    }

    async fn close(&self) -> DbResult<()> {
        Ok(())
    }
}
