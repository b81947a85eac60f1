//! Episodic → semantic consolidation.
//!
//! A consolidation pass never retypes a memory. Each promoted episodic
//! memory yields a *new* semantic memory that links back to it, and the
//! source is stamped so it is skipped until the cooldown expires.

use hive_core::db::memory as rows;
use hive_core::types::{MemoryRecord, MemoryType, NewMemoryRecord};
use rusqlite::Connection;
use tracing::debug;

use crate::config::ConsolidationPolicy;
use crate::utils::{hours_before, to_millis};
use chrono::{DateTime, Utc};

/// Whether a memory is important and used enough to promote.
pub fn should_consolidate(record: &MemoryRecord, policy: &ConsolidationPolicy) -> bool {
    record.importance > policy.min_importance && record.access_count > policy.min_access_count
}

/// Content of the semantic memory derived from an episodic one.
pub fn consolidated_content(content: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!("Learned: {content} (Context: {ctx})"),
        None => format!("Learned: {content}"),
    }
}

/// Build the semantic memory for a promoted source.
pub fn derive_semantic(source: &MemoryRecord, policy: &ConsolidationPolicy, now: i64) -> NewMemoryRecord {
    NewMemoryRecord {
        agent_id: source.agent_id.clone(),
        memory_type: MemoryType::Semantic,
        memory_category: source.memory_category,
        content: consolidated_content(&source.content, source.context.as_deref()),
        context: Some(format!("Consolidated from episodic memory {}", source.id)),
        tags: source.tags.clone(),
        importance: (source.importance * policy.importance_boost).min(1.0),
        confidence: source.confidence,
        related_memories: vec![source.id],
        extensions: Default::default(),
        created_at: now,
    }
}

/// Run one pass for an agent. Returns how many memories were promoted.
pub(crate) fn consolidate(
    conn: &Connection,
    agent_id: &str,
    policy: &ConsolidationPolicy,
    as_of: DateTime<Utc>,
) -> hive_core::Result<usize> {
    let now = to_millis(as_of);
    let cutoff = hours_before(as_of, policy.cooldown_hours);
    let candidates = rows::consolidation_candidates(conn, agent_id, MemoryType::Episodic, cutoff)?;

    let mut consolidated = 0;
    for source in candidates.iter().filter(|m| should_consolidate(m, policy)) {
        let semantic_id = rows::insert_memory(conn, &derive_semantic(source, policy, now))?;
        rows::mark_consolidated(conn, source.id, now)?;
        debug!(source_id = source.id, semantic_id, "Consolidated memory");
        consolidated += 1;
    }

    Ok(consolidated)
}
