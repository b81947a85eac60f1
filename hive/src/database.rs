//! Database and engine construction for the CLI.
//!
//! Each invocation opens one handle from the resolved config and passes it
//! down explicitly; nothing is cached in globals.

use anyhow::{Context, Result};
use hive_core::Database;
use hive_memory::MemoryEngine;
use std::sync::Arc;

use crate::config::Config;

/// Open the configured database file, creating it on first use.
pub fn open_database(config: &Config) -> Result<Arc<Database>> {
    let path = &config.database.path;
    tracing::debug!(path = %path.display(), "Opening database");
    let db = Database::open_path(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    db.ping()
        .with_context(|| format!("Database {} is not responding", path.display()))?;
    Ok(Arc::new(db))
}

/// Open the database and build a memory engine over it.
pub fn open_engine(config: &Config) -> Result<MemoryEngine> {
    let db = open_database(config)?;
    MemoryEngine::new(db, config.memory.clone()).context("Failed to start memory engine")
}
