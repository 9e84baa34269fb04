//! Backend selection from a connection string

use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::postgres::PgBackend;
use crate::traits::Database;
use sl_core::SslMode;
use std::time::Duration;

/// Backend a connection string resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// `postgres://` or `postgresql://`
    Postgres,
    /// `duckdb://<path>`, `:memory:` or a `.duckdb` file path
    DuckDb { path: String },
}

impl BackendKind {
    /// Resolve the backend for `url`
    pub fn from_url(url: &str) -> DbResult<Self> {
        let url = url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(BackendKind::Postgres);
        }
        if let Some(path) = url.strip_prefix("duckdb://") {
            if path.is_empty() {
                return Err(DbError::UnsupportedUrl(url.to_string()));
            }
            return Ok(BackendKind::DuckDb {
                path: path.to_string(),
            });
        }
        if url == ":memory:" || url.ends_with(".duckdb") {
            return Ok(BackendKind::DuckDb {
                path: url.to_string(),
            });
        }
        Err(DbError::UnsupportedUrl(url.to_string()))
    }
}

/// Connection tuning
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    /// Hard limit on connection establishment
    pub timeout: Duration,
    /// TLS override for Postgres
    pub ssl_mode: Option<SslMode>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            ssl_mode: None,
        }
    }
}

/// Open a session to the database named by `url`.
///
/// The caller owns the returned session and must [`close`](Database::close) it.
pub async fn connect(url: &str, options: ConnectOptions) -> DbResult<Box<dyn Database>> {
    match BackendKind::from_url(url)? {
        BackendKind::Postgres => {
            let backend = PgBackend::connect(url, options.timeout, options.ssl_mode).await?;
            log::info!("Connected to postgres at {}", backend.endpoint());
            Ok(Box::new(backend))
        }
        BackendKind::DuckDb { path } => {
            let backend = DuckDbBackend::new(&path)?;
            log::info!("Opened duckdb database {path}");
            Ok(Box::new(backend))
        }
    }
}
