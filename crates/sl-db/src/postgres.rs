//! Postgres database backend implementation (sqlx)

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Row};
use async_trait::async_trait;
use sl_core::gate::redacted_endpoint;
use sl_core::SslMode;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{Connection, Row as _};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

/// Postgres backend over a single session.
///
/// Statements use unnamed, non-cached prepared statements so the backend also
/// works behind a transaction-mode pooler (PgBouncer / Supavisor).
pub struct PgBackend {
    conn: Mutex<Option<PgConnection>>,
    endpoint: String,
}

impl PgBackend {
    /// Connect to `url`, giving up after `timeout`.
    ///
    /// `ssl_mode` overrides any `sslmode` in the URL when set.
    pub async fn connect(
        url: &str,
        timeout: Duration,
        ssl_mode: Option<SslMode>,
    ) -> DbResult<Self> {
        let endpoint = redacted_endpoint(url);
        let mut options = PgConnectOptions::from_str(url)
            .map_err(|e| DbError::ConnectionError(format!("invalid connection string: {e}")))?
            .statement_cache_capacity(0);
        if let Some(mode) = ssl_mode {
            options = options.ssl_mode(match mode {
                SslMode::Disable => PgSslMode::Disable,
                SslMode::Prefer => PgSslMode::Prefer,
                SslMode::Require => PgSslMode::Require,
            });
        }

        log::debug!("Connecting to postgres at {endpoint}");
        let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| DbError::ConnectTimeout {
                endpoint: endpoint.clone(),
                secs: timeout.as_secs(),
            })?
            .map_err(|e| DbError::ConnectionError(format!("{endpoint}: {e}")))?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            endpoint,
        })
    }

    /// Host and port this backend is connected to, without credentials
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Database for PgBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DbError::Closed)?;
        // A bare &str with no arguments runs over the simple-query protocol.
        sqlx::Executor::execute(&mut *conn, sql).await?;
        Ok(())
    }

    async fn execute_with(&self, sql: &str, params: &[&str]) -> DbResult<u64> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DbError::Closed)?;
        let mut query = sqlx::query(sql).persistent(false);
        for param in params {
            query = query.bind(*param);
        }
        let result = query.execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    async fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DbError::Closed)?;
        let mut query = sqlx::query(sql).persistent(false);
        for param in params {
            query = query.bind(*param);
        }
        let rows = query.fetch_all(&mut *conn).await?;

        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| row.try_get::<Option<String>, _>(i).map_err(DbError::from))
                    .collect::<DbResult<Row>>()
            })
            .collect()
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) -> DbResult<()> {
        let conn = self.conn.lock().await.take();
        match conn {
            Some(conn) => {
                conn.close().await?;
                log::debug!("Closed postgres connection to {}", self.endpoint);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let err = PgBackend::connect(
            "postgres://user@host:notaport/db",
            Duration::from_secs(1),
            None,
        )
        .await
        .err()
        .expect("invalid port must fail");
        assert!(matches!(err, DbError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_bounded_by_timeout() {
        // 192.0.2.0/24 is reserved for documentation and never routed.
        let result = PgBackend::connect(
            "postgres://user:pw@192.0.2.1:5432/db",
            Duration::from_millis(200),
            Some(SslMode::Disable),
        )
        .await;
        match result {
            Err(DbError::ConnectTimeout { endpoint, secs }) => {
                assert_eq!(endpoint, "192.0.2.1:5432");
                assert_eq!(secs, 0);
            }
            Err(DbError::ConnectionError(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connection to a documentation address succeeded"),
        }
    }
}
