//! SQLSTATE condition codes the engine cares about.
//!
//! Postgres reports these natively. The DuckDB backend maps its catalog and
//! constraint messages onto the same codes.

/// `duplicate_table`: relation (table, view, sequence, index) already exists
pub const DUPLICATE_TABLE: &str = "42P07";

/// `duplicate_column`: column already exists
pub const DUPLICATE_COLUMN: &str = "42701";

/// `duplicate_object`: constraint, type or other object already exists
pub const DUPLICATE_OBJECT: &str = "42710";

/// `duplicate_schema`: schema already exists
pub const DUPLICATE_SCHEMA: &str = "42P06";

/// `unique_violation`: insert collided with a unique constraint
pub const UNIQUE_VIOLATION: &str = "23505";

/// `undefined_table`: relation does not exist
pub const UNDEFINED_TABLE: &str = "42P01";

/// `syntax_error`
pub const SYNTAX_ERROR: &str = "42601";
