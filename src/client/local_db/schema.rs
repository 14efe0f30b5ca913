//! Database Schema Definitions
//!
//! Table layout of the local store and the migration bookkeeping around it.

/// DDL for every table and index; each statement is `IF NOT EXISTS`
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Current database schema version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Schema migration versions
pub const MIGRATION_VERSIONS: &[i64] = &[1];

/// Table holding downloaded study sets
pub const CACHED_SETS_TABLE: &str = "cached_sets";

/// Table holding recorded attempts
pub const PENDING_ATTEMPTS_TABLE: &str = "pending_attempts";

/// Check if database needs migration
pub fn needs_migration(current_version: i64) -> bool {
    current_version < CURRENT_SCHEMA_VERSION
}

/// Get pending migrations
pub fn get_pending_migrations(current_version: i64) -> Vec<i64> {
    MIGRATION_VERSIONS
        .iter()
        .filter(|&&v| v > current_version)
        .cloned()
        .collect()
}
