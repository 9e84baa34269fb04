//! Statement failure classification.
//!
//! Re-running a change-script after a partial failure replays statements whose
//! effect is already in the schema. Those fail with "already exists" style
//! condition codes, and only those may be skipped. Everything else (syntax,
//! permissions, lost connections, data constraint violations) is fatal.

use crate::error::DbError;
use crate::sqlstate;
use sl_core::CollisionKind;
use std::collections::HashMap;

/// Verdict on a failed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The change is already present; skip the statement and continue
    Ignorable(CollisionKind),
    /// Abort the run
    Fatal,
}

impl Classification {
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Classification::Ignorable(_))
    }
}

/// Condition-code table deciding which failures are idempotency collisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassifier {
    ignorable: HashMap<String, CollisionKind>,
}

impl Default for ErrorClassifier {
    /// Postgres SQLSTATE table: duplicate table, column and object
    fn default() -> Self {
        Self::new([
            (sqlstate::DUPLICATE_TABLE, CollisionKind::Relation),
            (sqlstate::DUPLICATE_COLUMN, CollisionKind::Column),
            (sqlstate::DUPLICATE_OBJECT, CollisionKind::Object),
        ])
    }
}

impl ErrorClassifier {
    /// Classifier over an explicit code table
    pub fn new<I, S>(table: I) -> Self
    where
        I: IntoIterator<Item = (S, CollisionKind)>,
        S: Into<String>,
    {
        Self {
            ignorable: table.into_iter().map(|(c, k)| (c.into(), k)).collect(),
        }
    }

    /// Classifier that treats every failure as fatal
    pub fn empty() -> Self {
        Self {
            ignorable: HashMap::new(),
        }
    }

    /// Add (or replace) one ignorable code
    pub fn with_ignorable(mut self, code: impl Into<String>, kind: CollisionKind) -> Self {
        self.ignorable.insert(code.into(), kind);
        self
    }

    /// Merge extra codes, e.g. from `ignorable_codes` in sluice.yml
    pub fn extend<I, S>(mut self, table: I) -> Self
    where
        I: IntoIterator<Item = (S, CollisionKind)>,
        S: Into<String>,
    {
        self.ignorable
            .extend(table.into_iter().map(|(c, k)| (c.into(), k)));
        self
    }

    /// Classify a failed statement
    pub fn classify(&self, err: &DbError) -> Classification {
        err.code()
            .and_then(|code| self.ignorable.get(code))
            .map_or(Classification::Fatal, |kind| {
                Classification::Ignorable(*kind)
            })
    }

    /// Ignorable codes, sorted
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.ignorable.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
