//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sl_core::{Config, CoreError};
use sl_db::Database;
use sl_migrate::MigrateOptions;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Loaded project configuration and the directory it is relative to
pub(crate) struct ProjectContext {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl ProjectContext {
    /// Migration options for `database_url`, honouring a `--scripts-dir` override
    pub(crate) fn migrate_options(
        &self,
        database_url: &str,
        scripts_dir: Option<&str>,
    ) -> MigrateOptions {
        let options = MigrateOptions::from_config(&self.config, &self.root, database_url);
        match scripts_dir {
            Some(dir) => options.with_scripts_dir(resolve(&self.root, dir)),
            None => options,
        }
    }
}

fn resolve(root: &Path, dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Load `sluice.yml` from `--config` or the project directory
pub(crate) fn load_project(global: &GlobalArgs) -> Result<ProjectContext> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load configuration")?;
    Ok(ProjectContext { root, config })
}

/// Connection string from `--database-url` / `DATABASE_URL`
pub(crate) fn require_database_url(global: &GlobalArgs) -> Result<String> {
    global
        .database_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CoreError::MissingDatabaseUrl.into())
}

/// Open a session for ad-hoc inspection commands
pub(crate) async fn open_session(global: &GlobalArgs) -> Result<Box<dyn Database>> {
    let project = load_project(global)?;
    let url = require_database_url(global)?;
    let options = project.migrate_options(&url, None);
    Ok(sl_migrate::open_session(&options).await?)
}

/// Close `db`, logging instead of failing: the command's own result matters more
pub(crate) async fn close_session(db: Box<dyn Database>) {
    if let Err(e) = db.close().await {
        log::warn!("Failed to close database session: {e}");
    }
}

/// Table names in the session's default schema, sorted
pub(crate) async fn list_tables(db: &dyn Database, prefix: Option<&str>) -> Result<Vec<String>> {
    let rows = db
        .query_rows(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = $1 ORDER BY table_name",
            &[db.default_schema()],
        )
        .await
        .context("Failed to list tables")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_iter().next().flatten())
        .filter(|name| prefix.map_or(true, |p| name.starts_with(p)))
        .collect())
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
