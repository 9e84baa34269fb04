//! Forward-only migration runner.
//!
//! Scripts are applied in name order. Within a script, statements run one at a
//! time in file order. A statement that collides with schema already in place
//! (an ignorable condition code) is skipped; any other failure aborts the run
//! and leaves the script unrecorded, so the next run replays it from the top.
//! A script is recorded in the ledger only after all of its statements ran.

use crate::error::{MigrateError, MigrateResult};
use crate::ledger::{Ledger, LedgerEntry};
use sl_core::splitter::preview;
use sl_core::{ChangeScript, ScriptStore};
use sl_db::{Classification, Database, ErrorClassifier};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const PREVIEW_CHARS: usize = 80;

/// What happened to one script during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// Already in the ledger; nothing executed
    SkippedAlreadyApplied,
    /// Executed and recorded
    Applied {
        /// Statements the script split into
        statements: usize,
        /// Statements skipped as idempotency collisions
        ignored: usize,
    },
}

/// Per-script line of a [`RunResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub name: String,
    pub outcome: ScriptOutcome,
    pub duration: Duration,
}

/// Summary of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Scripts executed and recorded in this run
    pub applied: usize,
    /// Scripts skipped because the ledger already had them
    pub skipped: usize,
    /// Scripts found in the store
    pub total: usize,
    /// Statements skipped as idempotency collisions, across all scripts
    pub ignored_statements: usize,
    /// One report per script, in application order
    pub scripts: Vec<ScriptReport>,
    pub duration: Duration,
}

impl RunResult {
    /// Whether the run changed nothing
    pub fn is_noop(&self) -> bool {
        self.applied == 0
    }

    /// Names of the scripts applied in this run
    pub fn applied_names(&self) -> Vec<&str> {
        self.scripts
            .iter()
            .filter(|r| matches!(r.outcome, ScriptOutcome::Applied { .. }))
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Ledger state of one script in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStatus {
    pub name: String,
    /// SHA-256 of the script text on disk
    pub checksum: String,
    /// When it was recorded; `None` while pending
    pub applied_at: Option<String>,
    /// Whether it has been recorded
    pub applied: bool,
}

/// Store contents compared against the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Every script in the store, in application order
    pub scripts: Vec<ScriptStatus>,
    /// Ledger entries with no matching script on disk
    pub orphaned: Vec<LedgerEntry>,
    /// Whether the ledger table exists yet
    pub ledger_exists: bool,
}

impl StatusReport {
    pub fn pending(&self) -> impl Iterator<Item = &ScriptStatus> {
        self.scripts.iter().filter(|s| !s.applied)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }
}

/// Applies a [`ScriptStore`] to a database session
pub struct MigrationRunner<'a> {
    db: &'a dyn Database,
    store: ScriptStore,
    ledger: Ledger<'a>,
    classifier: ErrorClassifier,
}

impl<'a> MigrationRunner<'a> {
    /// Runner with the default ledger table and classifier
    pub fn new(db: &'a dyn Database, store: ScriptStore) -> Self {
        Self {
            db,
            store,
            ledger: Ledger::with_default_table(db),
            classifier: ErrorClassifier::default(),
        }
    }

    /// Use `table` as the ledger
    pub fn with_ledger_table(mut self, table: impl Into<String>) -> MigrateResult<Self> {
        self.ledger = Ledger::new(self.db, table)?;
        Ok(self)
    }

    /// Replace the failure classifier
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn ledger(&self) -> &Ledger<'a> {
        &self.ledger
    }

    /// Apply every pending script.
    ///
    /// On a fatal statement failure the run stops immediately. Scripts applied
    /// earlier in the run stay applied and recorded; the failing script is
    /// left unrecorded. The error carries the script name, the statement
    /// position and how many scripts were applied before it.
    pub async fn run(&self) -> MigrateResult<RunResult> {
        let started = Instant::now();

        self.ledger.ensure_ledger().await?;
        let scripts = self.store.list_scripts()?;
        log::info!(
            "{} change-script(s) in {}",
            scripts.len(),
            self.store.dir().display()
        );

        let mut result = RunResult {
            total: scripts.len(),
            ..RunResult::default()
        };

        for script in &scripts {
            let script_started = Instant::now();

            if self.ledger.is_applied(&script.name).await? {
                log::debug!("{} already applied, skipping", script.name);
                result.skipped += 1;
                result.scripts.push(ScriptReport {
                    name: script.name.clone(),
                    outcome: ScriptOutcome::SkippedAlreadyApplied,
                    duration: script_started.elapsed(),
                });
                continue;
            }

            let outcome = self.apply_script(script, result.applied).await?;
            self.ledger.record_applied(&script.name).await?;

            if let ScriptOutcome::Applied { ignored, .. } = outcome {
                result.ignored_statements += ignored;
            }
            result.applied += 1;
            let duration = script_started.elapsed();
            log::info!("Applied {} in {}ms", script.name, duration.as_millis());
            result.scripts.push(ScriptReport {
                name: script.name.clone(),
                outcome,
                duration,
            });
        }

        result.duration = started.elapsed();
        if result.is_noop() {
            log::info!("Schema up to date ({} script(s) already applied)", result.skipped);
        } else {
            log::info!(
                "Applied {} script(s), skipped {} in {}ms",
                result.applied,
                result.skipped,
                result.duration.as_millis()
            );
        }
        Ok(result)
    }

    async fn apply_script(
        &self,
        script: &ChangeScript,
        applied_before: usize,
    ) -> MigrateResult<ScriptOutcome> {
        let statements = script.statements(self.store.breakpoint());
        let count = statements.len();
        log::info!("Applying {} ({count} statement(s))", script.name);

        let mut ignored = 0;
        for (index, statement) in statements.iter().enumerate() {
            log::debug!(
                "{} [{}/{count}] {}",
                script.name,
                index + 1,
                preview(statement, PREVIEW_CHARS)
            );

            let Err(err) = self.db.execute(statement).await else {
                continue;
            };

            match self.classifier.classify(&err) {
                Classification::Ignorable(kind) => {
                    ignored += 1;
                    log::warn!(
                        "{} [{}/{count}] skipped, {kind}: {err}",
                        script.name,
                        index + 1
                    );
                }
                Classification::Fatal => {
                    log::error!("{} [{}/{count}] failed: {err}", script.name, index + 1);
                    return Err(MigrateError::FatalStatement {
                        script: script.name.clone(),
                        statement_index: index,
                        statement_count: count,
                        statement: preview(statement, PREVIEW_CHARS),
                        applied_before,
                        source: err,
                    });
                }
            }
        }

        Ok(ScriptOutcome::Applied {
            statements: count,
            ignored,
        })
    }

    /// Scripts not yet recorded, in application order. Does not create the
    /// ledger.
    pub async fn pending(&self) -> MigrateResult<Vec<ChangeScript>> {
        let scripts = self.store.list_scripts()?;
        if !self.ledger.exists().await? {
            return Ok(scripts);
        }
        let mut pending = Vec::new();
        for script in scripts {
            if !self.ledger.is_applied(&script.name).await? {
                pending.push(script);
            }
        }
        Ok(pending)
    }

    /// Compare the store with the ledger. Does not create the ledger.
    pub async fn status(&self) -> MigrateResult<StatusReport> {
        let scripts = self.store.list_scripts()?;
        let ledger_exists = self.ledger.exists().await?;
        let entries = if ledger_exists {
            self.ledger.applied_entries().await?
        } else {
            Vec::new()
        };

        let mut recorded: HashMap<&str, &LedgerEntry> =
            entries.iter().map(|e| (e.name.as_str(), e)).collect();

        let statuses = scripts
            .iter()
            .map(|script| {
                let entry = recorded.remove(script.name.as_str());
                ScriptStatus {
                    name: script.name.clone(),
                    checksum: script.checksum(),
                    applied: entry.is_some(),
                    applied_at: entry.and_then(|e| e.applied_at.clone()),
                }
            })
            .collect();

        let orphaned = entries
            .iter()
            .filter(|e| recorded.contains_key(e.name.as_str()))
            .cloned()
            .collect();

        Ok(StatusReport {
            scripts: statuses,
            orphaned,
            ledger_exists,
        })
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
