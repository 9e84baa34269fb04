//! Error types for sl-db

use crate::sqlstate;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Connection establishment exceeded the configured limit (D002)
    #[error("[D002] Connecting to {endpoint} timed out after {secs}s")]
    ConnectTimeout { endpoint: String, secs: u64 },

    /// Statement execution error, with the backend's condition code (D003)
    #[error("[D003] SQL execution failed{}: {message}", code_suffix(.code))]
    ExecutionError {
        code: Option<String>,
        message: String,
    },

    /// Connection string names no supported backend (D004)
    #[error("[D004] Unsupported connection string '{0}': expected postgres://, postgresql://, duckdb:// or a .duckdb path")]
    UnsupportedUrl(String),

    /// Connection used after close (D005)
    #[error("[D005] Database connection already closed")]
    Closed,

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" [{c}]"))
        .unwrap_or_default()
}

impl DbError {
    /// Execution error carrying a condition code
    pub fn execution(code: impl Into<String>, message: impl Into<String>) -> Self {
        DbError::ExecutionError {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Backend condition code, when the failure is a statement error that has one
    pub fn code(&self) -> Option<&str> {
        match self {
            DbError::ExecutionError { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this is a unique-constraint violation
    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(sqlstate::UNIQUE_VIOLATION)
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants or SQLSTATE, so
        // the message is the only thing to go on. Patterns are kept narrow.
        let message = err.to_string();
        DbError::ExecutionError {
            code: duckdb_condition_code(&message).map(str::to_string),
            message,
        }
    }
}

/// Map a DuckDB error message onto the equivalent SQLSTATE code
pub(crate) fn duckdb_condition_code(message: &str) -> Option<&'static str> {
    if message.contains("already exists") {
        if message.contains("Column with name") {
            return Some(sqlstate::DUPLICATE_COLUMN);
        }
        if message.contains("Schema with name") {
            return Some(sqlstate::DUPLICATE_SCHEMA);
        }
        if ["Table with name", "View with name", "Index with name", "Sequence with name"]
            .iter()
            .any(|p| message.contains(p))
        {
            return Some(sqlstate::DUPLICATE_TABLE);
        }
        if message.contains("Catalog Error") {
            return Some(sqlstate::DUPLICATE_OBJECT);
        }
    }
    if message.contains("Duplicate key")
        || message.contains("violates unique constraint")
        || message.contains("violates primary key constraint")
        || message.contains("UNIQUE constraint violated")
    {
        return Some(sqlstate::UNIQUE_VIOLATION);
    }
    if message.contains("Catalog Error") && message.contains("does not exist") {
        return Some(sqlstate::UNDEFINED_TABLE);
    }
    if message.contains("Parser Error") {
        return Some(sqlstate::SYNTAX_ERROR);
    }
    None
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            return DbError::ExecutionError {
                code: db_err.code().map(|c| c.into_owned()),
                message: db_err.message().to_string(),
            };
        }
        if matches!(
            err,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::Protocol(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ) {
            return DbError::ConnectionError(err.to_string());
        }
        DbError::ExecutionError {
            code: None,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_display_includes_code() {
        let err = DbError::execution("42P07", "relation \"a\" already exists");
        assert_eq!(
            err.to_string(),
            "[D003] SQL execution failed [42P07]: relation \"a\" already exists"
        );
        assert_eq!(err.code(), Some("42P07"));
    }

    #[test]
    fn test_execution_display_without_code() {
        let err = DbError::ExecutionError {
            code: None,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "[D003] SQL execution failed: boom");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_non_statement_errors_have_no_code() {
        assert_eq!(DbError::ConnectionError("refused".into()).code(), None);
        assert_eq!(DbError::Closed.code(), None);
    }

    #[test]
    fn test_unique_violation() {
        assert!(DbError::execution("23505", "dup").is_unique_violation());
        assert!(!DbError::execution("42P07", "dup").is_unique_violation());
    }

    #[test]
    fn test_duckdb_message_mapping() {
        assert_eq!(
            duckdb_condition_code("Catalog Error: Table with name a already exists!"),
            Some(sqlstate::DUPLICATE_TABLE)
        );
        assert_eq!(
            duckdb_condition_code("Catalog Error: Index with name a_idx already exists!"),
            Some(sqlstate::DUPLICATE_TABLE)
        );
        assert_eq!(
            duckdb_condition_code("Catalog Error: Column with name x already exists!"),
            Some(sqlstate::DUPLICATE_COLUMN)
        );
        assert_eq!(
            duckdb_condition_code("Catalog Error: Schema with name s already exists!"),
            Some(sqlstate::DUPLICATE_SCHEMA)
        );
        assert_eq!(
            duckdb_condition_code("Catalog Error: Type with name mood already exists!"),
            Some(sqlstate::DUPLICATE_OBJECT)
        );
        assert_eq!(
            duckdb_condition_code(
                "Constraint Error: Duplicate key \"hash: 0001_init.sql\" violates unique constraint."
            ),
            Some(sqlstate::UNIQUE_VIOLATION)
        );
        assert_eq!(
            duckdb_condition_code("Catalog Error: Table with name nope does not exist!"),
            Some(sqlstate::UNDEFINED_TABLE)
        );
        assert_eq!(
            duckdb_condition_code("Parser Error: syntax error at or near \"CREAT\""),
            Some(sqlstate::SYNTAX_ERROR)
        );
        assert_eq!(duckdb_condition_code("Binder Error: something else"), None);
    }
}
