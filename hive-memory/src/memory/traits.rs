//! Seams the engine depends on.

use hive_core::types::MemoryRecord;
use hive_core::Database;

/// Resolves an agent name to the internal owner id used by storage.
///
/// Implementations fail closed: an unknown name is `Ok(None)`, never a
/// guessed id.
pub trait AgentDirectory: Send + Sync {
    fn resolve(&self, name: &str) -> hive_core::Result<Option<String>>;
}

impl AgentDirectory for Database {
    fn resolve(&self, name: &str) -> hive_core::Result<Option<String>> {
        Ok(self.get_agent_by_name(name)?.map(|agent| agent.id))
    }
}

/// Decides whether a memory matches a free-text search.
///
/// Swapping the implementation changes search without touching callers.
pub trait MemoryMatcher: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Whether `record` matches `terms` (already lower-cased and split).
    fn is_match(&self, terms: &[String], record: &MemoryRecord) -> bool;

    /// Terms storage can match itself as ASCII case-insensitive substrings
    /// of content or context, so filtering and the limit run in SQL.
    ///
    /// `None` (the default) hands every candidate to [`is_match`](Self::is_match).
    fn storage_terms(&self, _terms: &[String]) -> Option<Vec<String>> {
        None
    }
}
