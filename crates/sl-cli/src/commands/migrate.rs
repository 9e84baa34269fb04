//! Migrate command implementation

use anyhow::Result;
use sl_core::gate::redacted_endpoint;
use sl_core::{ChangeScript, DeployContext, DeployGate, Gate, GateDecision, ManualGate};
use sl_db::Database;
use sl_migrate::{
    MigrateError, MigrateOptions, MigrateResult, MigrationRunner, RunResult, ScriptOutcome,
};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{close_session, load_project};

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let ctx = DeployContext::from_env().with_database_url(global.database_url.clone());

    let database_url = match decide(args.deploy, &ctx)? {
        GateDecision::Run { database_url } => database_url,
        GateDecision::Skip { reason } => {
            println!("Skipping migrations: {reason}");
            return Ok(());
        }
    };

    let options = project.migrate_options(&database_url, args.scripts_dir.as_deref());
    println!(
        "Migrating {} from {}",
        redacted_endpoint(&database_url),
        options.scripts_dir.display()
    );

    if args.dry_run {
        return dry_run(&options).await;
    }

    match sl_migrate::run_migrations(&options).await {
        Ok(result) => {
            print_summary(&result, global.verbose);
            Ok(())
        }
        Err(e) => {
            if let MigrateError::FatalStatement {
                script,
                applied_before,
                ..
            } = &e
            {
                println!("  ✗ {script}");
                println!();
                println!(
                    "{applied_before} script(s) applied before the failure stay applied. \
                     Fix {script} and run again; statements it already applied will be skipped."
                );
            }
            Err(e.into())
        }
    }
}

/// `--deploy` applies the build-time policy; a manual run only needs a URL
pub(crate) fn decide(deploy: bool, ctx: &DeployContext) -> Result<GateDecision> {
    let gate: &dyn Gate = if deploy { &DeployGate } else { &ManualGate };
    Ok(gate.should_run(ctx)?)
}

async fn dry_run(options: &MigrateOptions) -> Result<()> {
    let db = sl_migrate::open_session(options).await?;
    let pending = pending_scripts(db.as_ref(), options).await;
    close_session(db).await;
    let pending = pending?;

    if pending.is_empty() {
        println!("Dry run - schema is up to date");
        return Ok(());
    }

    println!("Dry run - would apply {} script(s):", pending.len());
    for script in &pending {
        let statements = script.statements(&options.breakpoint).len();
        println!("  {} ({} statement(s))", script.name, statements);
    }
    Ok(())
}

async fn pending_scripts(
    db: &dyn Database,
    options: &MigrateOptions,
) -> MigrateResult<Vec<ChangeScript>> {
    MigrationRunner::new(db, options.store())
        .with_ledger_table(options.ledger_table.as_str())?
        .pending()
        .await
}

fn print_summary(result: &RunResult, verbose: bool) {
    for report in &result.scripts {
        match report.outcome {
            ScriptOutcome::Applied {
                statements,
                ignored: 0,
            } => println!(
                "  ✓ {} ({} statement(s)) [{}ms]",
                report.name,
                statements,
                report.duration.as_millis()
            ),
            ScriptOutcome::Applied {
                statements,
                ignored,
            } => println!(
                "  ✓ {} ({} statement(s), {} already present) [{}ms]",
                report.name,
                statements,
                ignored,
                report.duration.as_millis()
            ),
            ScriptOutcome::SkippedAlreadyApplied if verbose => {
                println!("  - {} (already applied)", report.name)
            }
            ScriptOutcome::SkippedAlreadyApplied => {}
        }
    }

    println!();
    if result.is_noop() {
        println!(
            "Schema up to date: {} script(s) already applied",
            result.skipped
        );
    } else {
        println!(
            "Applied {} of {} script(s), {} already applied [{}ms]",
            result.applied,
            result.total,
            result.skipped,
            result.duration.as_millis()
        );
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
