//! sl-core - Core library for Sluice
//!
//! This crate provides the pieces of a migration pass that never touch a
//! database: configuration parsing, change-script discovery, statement
//! splitting, and the deploy-time gate that decides whether a pass runs.

pub mod checksum;
pub mod config;
pub mod error;
pub mod gate;
pub mod script;
pub mod splitter;

pub use config::{CollisionKind, Config, SslMode};
pub use error::{CoreError, CoreResult};
pub use gate::{DeployContext, DeployGate, Gate, GateDecision, ManualGate};
pub use script::{ChangeScript, ScriptStore};
pub use splitter::{split, split_statements, DEFAULT_BREAKPOINT};
