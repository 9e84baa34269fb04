//! Change-script discovery.
//!
//! A [`ScriptStore`] is a directory of change-scripts. Scripts are listed in
//! byte-wise name order, which is the order they are applied in, so the same
//! directory yields the same sequence on every machine.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::splitter::{split_statements, DEFAULT_BREAKPOINT};
use std::fs;
use std::path::{Path, PathBuf};

/// A single schema-change script read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeScript {
    /// File name, e.g. `0001_init.sql`. Doubles as the ledger key.
    pub name: String,

    /// Location on disk
    pub path: PathBuf,

    /// Raw script text
    pub sql: String,
}

impl ChangeScript {
    /// Build a script from in-memory text (used by tests and embedders)
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            sql: sql.into(),
        }
    }

    /// Statements of this script, split on `marker`
    pub fn statements(&self, marker: &str) -> Vec<String> {
        split_statements(&self.sql, marker)
    }

    /// SHA-256 of the script text
    pub fn checksum(&self) -> String {
        compute_checksum(&self.sql)
    }
}

/// Read-only view of a change-script directory
#[derive(Debug, Clone)]
pub struct ScriptStore {
    dir: PathBuf,
    suffix: String,
    breakpoint: String,
}

impl ScriptStore {
    /// Store over `dir` recognising `.sql` files
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            suffix: ".sql".to_string(),
            breakpoint: DEFAULT_BREAKPOINT.to_string(),
        }
    }

    /// Override the recognised file suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Override the statement breakpoint marker
    pub fn with_breakpoint(mut self, breakpoint: impl Into<String>) -> Self {
        self.breakpoint = breakpoint.into();
        self
    }

    /// Directory this store reads from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Breakpoint marker used to split this store's scripts
    pub fn breakpoint(&self) -> &str {
        &self.breakpoint
    }

    /// List every recognised change-script, sorted by name ascending.
    ///
    /// Entries without the recognised suffix, and anything that is not a
    /// regular file, are skipped silently.
    pub fn list_scripts(&self) -> CoreResult<Vec<ChangeScript>> {
        if !self.dir.is_dir() {
            return Err(CoreError::ScriptsDirNotFound {
                path: self.dir.display().to_string(),
            });
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| CoreError::IoWithPath {
            path: self.dir.display().to_string(),
            source: e,
        })?;

        let mut scripts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: self.dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(&self.suffix) || !path.is_file() {
                continue;
            }

            let bytes = fs::read(&path).map_err(|e| CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })?;
            let sql = String::from_utf8(bytes).map_err(|_| CoreError::ScriptNotUtf8 {
                name: name.to_string(),
            })?;

            scripts.push(ChangeScript {
                name: name.to_string(),
                path: path.clone(),
                sql,
            });
        }

        scripts.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        log::debug!(
            "Found {} change-script(s) in {}",
            scripts.len(),
            self.dir.display()
        );
        Ok(scripts)
    }
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
