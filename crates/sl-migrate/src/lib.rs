//! sl-migrate - Migration engine for Sluice
//!
//! Applies a directory of change-scripts to a database exactly once each,
//! tracking progress in a ledger table inside that database. Runs are
//! forward-only and resumable: a run that stops partway through a script is
//! finished by simply running again.

pub mod error;
pub mod ledger;
pub mod runner;

#[cfg(test)]
mod test_utils;

pub use error::{MigrateError, MigrateResult};
pub use ledger::{Ledger, LedgerEntry, DEFAULT_LEDGER_TABLE};
pub use runner::{
    MigrationRunner, RunResult, ScriptOutcome, ScriptReport, ScriptStatus, StatusReport,
};

use sl_core::{Config, ScriptStore};
use sl_db::{ConnectOptions, Database, ErrorClassifier};
use std::path::{Path, PathBuf};

/// Everything one migration pass needs
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub database_url: String,
    pub scripts_dir: PathBuf,
    pub script_suffix: String,
    pub breakpoint: String,
    pub ledger_table: String,
    pub connect: ConnectOptions,
    pub classifier: ErrorClassifier,
}

impl MigrateOptions {
    /// Options with defaults for everything but the target and scripts
    pub fn new(database_url: impl Into<String>, scripts_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&Config::default(), Path::new(""), database_url)
            .with_scripts_dir(scripts_dir)
    }

    /// Options from a project config; relative paths resolve against `root`
    pub fn from_config(config: &Config, root: &Path, database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            scripts_dir: config.scripts_dir_absolute(root),
            script_suffix: config.script_suffix.clone(),
            breakpoint: config.breakpoint.clone(),
            ledger_table: config.ledger_table.clone(),
            connect: ConnectOptions {
                timeout: config.connect_timeout(),
                ssl_mode: config.ssl_mode,
            },
            classifier: ErrorClassifier::default().extend(
                config
                    .ignorable_codes
                    .iter()
                    .map(|(code, kind)| (code.clone(), *kind)),
            ),
        }
    }

    pub fn with_scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = dir.into();
        self
    }

    /// Script store these options describe
    pub fn store(&self) -> ScriptStore {
        ScriptStore::new(&self.scripts_dir)
            .with_suffix(&self.script_suffix)
            .with_breakpoint(&self.breakpoint)
    }

    fn validate(&self) -> MigrateResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(MigrateError::Configuration(
                "database connection string is not set".to_string(),
            ));
        }
        if self.scripts_dir.as_os_str().is_empty() {
            return Err(MigrateError::Configuration(
                "scripts directory is not set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Open a session for `options`. The caller must close it.
pub async fn open_session(options: &MigrateOptions) -> MigrateResult<Box<dyn Database>> {
    options.validate()?;
    sl_db::connect(&options.database_url, options.connect)
        .await
        .map_err(MigrateError::Connection)
}

/// Run one migration pass: connect, apply pending scripts, close.
///
/// The session is closed whether or not the pass succeeds.
pub async fn run_migrations(options: &MigrateOptions) -> MigrateResult<RunResult> {
    let db = open_session(options).await?;
    let result = apply(db.as_ref(), options).await;
    if let Err(e) = db.close().await {
        log::warn!("Failed to close database session: {e}");
    }
    result
}

/// Apply pending scripts over an already-open session
pub async fn apply(db: &dyn Database, options: &MigrateOptions) -> MigrateResult<RunResult> {
    MigrationRunner::new(db, options.store())
        .with_ledger_table(options.ledger_table.as_str())?
        .with_classifier(options.classifier.clone())
        .run()
        .await
}
