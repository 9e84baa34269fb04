//! Configuration types and parsing for sluice.yml

use crate::error::{CoreError, CoreResult};
use crate::splitter::DEFAULT_BREAKPOINT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project configuration from sluice.yml
///
/// Every field has a default, so a project without a config file behaves as
/// if an empty `sluice.yml` were present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the change-scripts, relative to the project directory
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: String,

    /// File suffix a change-script must carry to be picked up
    #[serde(default = "default_script_suffix")]
    pub script_suffix: String,

    /// Literal token separating statements inside one change-script
    #[serde(default = "default_breakpoint")]
    pub breakpoint: String,

    /// Name of the applied-migration ledger table (optionally schema-qualified)
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,

    /// Hard limit on connection establishment, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// TLS mode for Postgres connections; unset leaves the URL's `sslmode`
    #[serde(default)]
    pub ssl_mode: Option<SslMode>,

    /// Extra backend condition codes to treat as idempotency collisions.
    ///
    /// Merged over the built-in table, so a new ignorable case is a config
    /// change rather than a code change.
    #[serde(default)]
    pub ignorable_codes: BTreeMap<String, CollisionKind>,
}

/// What already existed when a statement collided with the current schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionKind {
    /// Table, view, sequence or index
    Relation,
    /// Column on an existing table
    Column,
    /// Constraint, type or other named object
    Object,
}

impl std::fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionKind::Relation => write!(f, "relation already exists"),
            CollisionKind::Column => write!(f, "column already exists"),
            CollisionKind::Object => write!(f, "object already exists"),
        }
    }
}

/// TLS mode for Postgres connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// Never use TLS
    Disable,
    /// Use TLS when the server offers it (default)
    #[default]
    Prefer,
    /// Always use TLS, without verifying the server certificate
    Require,
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SslMode::Disable => write!(f, "disable"),
            SslMode::Prefer => write!(f, "prefer"),
            SslMode::Require => write!(f, "require"),
        }
    }
}

fn default_scripts_dir() -> String {
    "drizzle/migrations-postgres".to_string()
}

fn default_script_suffix() -> String {
    ".sql".to_string()
}

fn default_breakpoint() -> String {
    DEFAULT_BREAKPOINT.to_string()
}

fn default_ledger_table() -> String {
    "drizzle_migrations".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scripts_dir: default_scripts_dir(),
            script_suffix: default_script_suffix(),
            breakpoint: default_breakpoint(),
            ledger_table: default_ledger_table(),
            connect_timeout_secs: default_connect_timeout_secs(),
            ssl_mode: None,
            ignorable_codes: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `sluice.yml` (or `sluice.yaml`) from a project directory,
    /// falling back to defaults when neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("sluice.yml");
        let yaml_path = dir.join("sluice.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            log::debug!("No sluice.yml in {}, using defaults", dir.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> CoreResult<()> {
        if self.script_suffix.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "script_suffix cannot be empty".to_string(),
            });
        }

        if self.breakpoint.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "breakpoint cannot be empty".to_string(),
            });
        }

        if self.connect_timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "connect_timeout_secs must be at least 1".to_string(),
            });
        }

        if !is_valid_table_name(&self.ledger_table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "ledger_table '{}' must be a lowercase identifier, optionally schema-qualified",
                    self.ledger_table
                ),
            });
        }

        if let Some(code) = self.ignorable_codes.keys().find(|c| c.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!("ignorable_codes contains an empty code: {code:?}"),
            });
        }

        Ok(())
    }

    /// Resolve the scripts directory against the project root
    pub fn scripts_dir_absolute(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.scripts_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }

    /// Connection timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// `name` or `schema.name`, each part `[a-z_][a-z0-9_]*`.
///
/// The ledger table name is interpolated unquoted into DDL, so nothing else is
/// allowed. Uppercase is rejected because Postgres folds unquoted names to
/// lowercase while `information_schema` lookups compare them verbatim.
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return false;
    }
    parts.iter().all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() || c == '_' => {
                chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            }
            _ => false,
        }
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
