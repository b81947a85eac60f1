//! Direct SQLite database access for hive.
//!
//! One [`Database`] owns one connection behind a mutex. Agent operations are
//! methods on the handle; memory row operations live in [`memory`] as free
//! functions over a connection so callers can compose several of them inside
//! a single [`Database::with_transaction`] call.

pub mod memory;
pub mod migrations;

use crate::error::{Error, Result};
use crate::types::Agent;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection wrapper.
///
/// Thread-safe via internal Mutex. All database operations acquire the lock.
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

impl Database {
    /// Open (or create) the database file at `path` and apply migrations.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        let db = Self::init(conn, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(db)
    }

    /// Open a private in-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// File backing this database, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check database connectivity
    pub fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute_batch("SELECT 1").map_err(Error::Database)
    }

    /// Run `f` inside one transaction.
    ///
    /// Commits when `f` returns `Ok`; any error rolls everything back.
    pub fn with_transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let mut conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let tx = conn.transaction().map_err(Error::Database)?;
        let value = f(&tx)?;
        tx.commit().map_err(Error::Database)?;
        Ok(value)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Agent Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register an agent by name, returning the existing row if already known.
    pub fn register_agent(&self, name: &str) -> Result<Agent> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidAgentName(name.to_string()));
        }

        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO agents (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![
                uuid::Uuid::new_v4().to_string(),
                name,
                chrono::Utc::now().timestamp_millis()
            ],
        )?;
        if inserted > 0 {
            tracing::info!(agent = name, "Registered agent");
        }

        let agent = conn.query_row(
            "SELECT id, name, created_at FROM agents WHERE name = ?1",
            params![name],
            Self::map_agent,
        )?;
        Ok(agent)
    }

    /// Get agent by name
    pub fn get_agent_by_name(&self, name: &str) -> Result<Option<Agent>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(conn
            .query_row(
                "SELECT id, name, created_at FROM agents WHERE name = ?1",
                params![name],
                Self::map_agent,
            )
            .optional()?)
    }

    /// List all agents ordered by name
    pub fn list_agents(&self) -> Result<Vec<Agent>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM agents ORDER BY name")?;
        let agents = stmt
            .query_map([], Self::map_agent)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(agents)
    }

    fn map_agent(row: &rusqlite::Row) -> rusqlite::Result<Agent> {
        Ok(Agent {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}
