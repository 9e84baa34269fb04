//! Tables command implementation

use anyhow::{Context, Result};
use sl_db::Database;

use crate::cli::{GlobalArgs, TablesArgs};
use crate::commands::common::{close_session, list_tables, open_session};

/// Execute the tables command
pub async fn execute(args: &TablesArgs, global: &GlobalArgs) -> Result<()> {
    let db = open_session(global).await?;
    let result = inspect(db.as_ref(), args).await;
    close_session(db).await;
    let (tables, columns) = result?;

    let filter_note = match &args.prefix {
        Some(prefix) => format!(" starting with '{prefix}'"),
        None => String::new(),
    };
    if tables.is_empty() {
        println!("No tables{filter_note}");
    } else {
        println!("{} table(s){filter_note}:", tables.len());
        for table in &tables {
            println!("  - {table}");
        }
    }

    if let (Some(table), Some(columns)) = (&args.columns, columns) {
        println!();
        if columns.is_empty() {
            println!("Table '{table}' not found");
        } else {
            println!("Columns in '{table}':");
            for (name, data_type) in columns {
                println!("  - {name} ({data_type})");
            }
        }
    }
    Ok(())
}

type Columns = Vec<(String, String)>;

async fn inspect(db: &dyn Database, args: &TablesArgs) -> Result<(Vec<String>, Option<Columns>)> {
    let tables = list_tables(db, args.prefix.as_deref()).await?;
    let columns = match &args.columns {
        Some(table) => Some(list_columns(db, table).await?),
        None => None,
    };
    Ok((tables, columns))
}

/// Column names and types of `table` in the default schema
pub(crate) async fn list_columns(db: &dyn Database, table: &str) -> Result<Columns> {
    let rows = db
        .query_rows(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position",
            &[db.default_schema(), table],
        )
        .await
        .with_context(|| format!("Failed to list columns of {table}"))?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let mut values = row.into_iter();
            let name = values.next().flatten()?;
            let data_type = values.next().flatten().unwrap_or_default();
            Some((name, data_type))
        })
        .collect())
}
