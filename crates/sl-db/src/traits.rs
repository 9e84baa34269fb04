//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// One result row, every column rendered as text (`None` for SQL NULL)
pub type Row = Vec<Option<String>>;

/// Database abstraction trait for Sluice
///
/// One implementation wraps one session. Calls are awaited one at a time;
/// implementations must be Send + Sync so a runner can hold `&dyn Database`
/// across await points.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement without parameters
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Execute a statement with `$1..$n` text parameters, returning affected rows
    async fn execute_with(&self, sql: &str, params: &[&str]) -> DbResult<u64>;

    /// Run a query with `$1..$n` text parameters.
    ///
    /// Columns must already be text; cast in SQL (`col::text`) where needed.
    async fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>>;

    /// Schema that unqualified table names resolve to
    fn default_schema(&self) -> &'static str;

    /// Database type identifier for logging and dialect choices
    fn db_type(&self) -> &'static str;

    /// Release the session. The backend may reject later calls with
    /// [`DbError::Closed`](crate::DbError::Closed).
    async fn close(&self) -> DbResult<()>;
}
