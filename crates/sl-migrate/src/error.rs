//! Error types for the migration engine.

use sl_core::CoreError;
use sl_db::DbError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Missing or unusable invocation settings; the run never started (M001)
    #[error("[M001] Migration configuration invalid: {0}")]
    Configuration(String),

    /// Could not open the database session; nothing was touched (M002)
    #[error("[M002] Database connection failed")]
    Connection(#[source] DbError),

    /// Change-script store or config error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A statement failed with a non-ignorable error; the run was aborted and
    /// `script` was not recorded as applied (M003)
    #[error(
        "[M003] Statement {}/{statement_count} of '{script}' failed ({applied_before} script(s) applied earlier in this run): {statement}",
        .statement_index + 1
    )]
    FatalStatement {
        script: String,
        /// Zero-based position of the failing statement
        statement_index: usize,
        statement_count: usize,
        /// First line of the failing statement
        statement: String,
        applied_before: usize,
        #[source]
        source: DbError,
    },

    /// Internal consistency broken, e.g. a script recorded twice (M004)
    #[error("[M004] Ledger invariant violated: {0}")]
    InvariantViolation(String),

    /// Reading or writing the ledger failed (M005)
    #[error("[M005] Ledger {operation} failed")]
    Ledger {
        operation: String,
        #[source]
        source: DbError,
    },
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    /// Name of the script the run stopped at, for fatal statement failures
    pub fn failed_script(&self) -> Option<&str> {
        match self {
            MigrateError::FatalStatement { script, .. } => Some(script),
            _ => None,
        }
    }
}
