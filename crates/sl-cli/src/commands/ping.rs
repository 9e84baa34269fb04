//! Ping command implementation

use anyhow::{Context, Result};
use sl_core::gate::redacted_endpoint;
use sl_db::Database;
use std::time::Instant;

use crate::cli::GlobalArgs;
use crate::commands::common::{close_session, list_tables, open_session, require_database_url};

/// Execute the ping command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let url = require_database_url(global)?;
    println!("Connecting to {}...", redacted_endpoint(&url));

    let started = Instant::now();
    let db = open_session(global).await?;
    let connected_in = started.elapsed();

    let result = report(db.as_ref()).await;
    close_session(db).await;
    let (version, schema, tables) = result?;

    println!(
        "  ✓ Connected to {} [{}ms]",
        version,
        connected_in.as_millis()
    );
    println!("  {} table(s) in schema {}", tables.len(), schema);
    Ok(())
}

async fn report(db: &dyn Database) -> Result<(String, &'static str, Vec<String>)> {
    let rows = db
        .query_rows("SELECT version()", &[])
        .await
        .context("Failed to query server version")?;
    let version = rows
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next().flatten())
        .map(|v| short_version(db.db_type(), &v))
        .unwrap_or_else(|| db.db_type().to_string());
    let tables = list_tables(db, None).await?;
    Ok((version, db.default_schema(), tables))
}

/// `PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by ...` -> `PostgreSQL 16.2 on x86_64-pc-linux-gnu`
fn short_version(db_type: &str, version: &str) -> String {
    let first = version.split(',').next().unwrap_or(version).trim();
    if first.to_ascii_lowercase().starts_with(db_type) {
        first.to_string()
    } else {
        format!("{db_type} {first}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_version_postgres() {
        assert_eq!(
            short_version(
                "postgres",
                "PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by gcc, 64-bit"
            ),
            "PostgreSQL 16.2 on x86_64-pc-linux-gnu"
        );
    }

    #[test]
    fn test_short_version_duckdb() {
        assert_eq!(short_version("duckdb", "v1.1.3"), "duckdb v1.1.3");
    }
}
