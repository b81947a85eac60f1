//! Schema migrations
//!
//! SQL migrations are embedded as strings and applied in order when a
//! database is opened. The applied version is tracked in `schema_version`.

use crate::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Memory engine tables (001)
pub const MEMORY_ENGINE_SQL: &str = include_str!("001_memory_engine.sql");

/// Highest schema version this build can apply.
pub const SCHEMA_VERSION: i64 = 1;

const MIGRATIONS: &[(i64, &str)] = &[(1, MEMORY_ENGINE_SQL)];

/// Apply every migration newer than the stored version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )?;

    let current = current_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(Error::SchemaVersion {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        conn.execute_batch(sql)?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![version, chrono::Utc::now().timestamp_millis()],
        )?;
        tracing::debug!(version, "Applied schema migration");
    }

    Ok(())
}

/// Stored schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}
