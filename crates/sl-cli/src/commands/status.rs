//! Status command implementation

use anyhow::Result;
use sl_core::checksum::short_checksum;
use sl_db::Database;
use sl_migrate::{MigrateOptions, MigrateResult, MigrationRunner, StatusReport};

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{close_session, load_project, require_database_url};

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let url = require_database_url(global)?;
    let options = project.migrate_options(&url, args.scripts_dir.as_deref());

    let db = sl_migrate::open_session(&options).await?;
    let report = collect(db.as_ref(), &options).await;
    close_session(db).await;
    let report = report?;

    print_report(&report, &options);
    Ok(())
}

async fn collect(db: &dyn Database, options: &MigrateOptions) -> MigrateResult<StatusReport> {
    MigrationRunner::new(db, options.store())
        .with_ledger_table(options.ledger_table.as_str())?
        .status()
        .await
}

fn print_report(report: &StatusReport, options: &MigrateOptions) {
    if !report.ledger_exists {
        println!(
            "Ledger table {} does not exist yet; nothing has been applied",
            options.ledger_table
        );
    }

    if report.scripts.is_empty() {
        println!("No change-scripts in {}", options.scripts_dir.display());
    } else {
        let width = report
            .scripts
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0);
        println!("Change-scripts in {}:", options.scripts_dir.display());
        for script in &report.scripts {
            let state = match (script.applied, &script.applied_at) {
                (true, Some(at)) => format!("applied {at}"),
                (true, None) => "applied".to_string(),
                (false, _) => "pending".to_string(),
            };
            println!(
                "  {:width$}  {}  {}",
                script.name,
                short_checksum(&script.checksum, 8),
                state,
            );
        }
    }

    if !report.orphaned.is_empty() {
        println!();
        println!("Recorded but missing from disk:");
        for entry in &report.orphaned {
            println!("  ? {}", entry.name);
        }
    }

    println!();
    println!(
        "{} applied, {} pending",
        report.scripts.len() - report.pending_count(),
        report.pending_count()
    );
}
