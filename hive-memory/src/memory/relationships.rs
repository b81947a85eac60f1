//! Relationship graph between memories.
//!
//! Edges are written only when a memory is stored, one `related` edge per
//! id the caller listed. Targets are not validated and may be forgotten
//! later, so readers must treat every edge as possibly dangling.

use hive_core::db::memory as rows;
use hive_core::types::{MemoryId, NewMemoryRelationship};
use rusqlite::Connection;

/// Edges from a freshly stored memory, duplicates and self-links removed.
pub fn edges_for(source_id: MemoryId, related: &[MemoryId]) -> Vec<NewMemoryRelationship> {
    let mut targets: Vec<MemoryId> = related.iter().copied().filter(|id| *id != source_id).collect();
    targets.sort_unstable();
    targets.dedup();
    targets
        .into_iter()
        .map(|target| NewMemoryRelationship::related(source_id, target))
        .collect()
}

/// Write the edges for a freshly stored memory. Returns how many were written.
pub(crate) fn link(conn: &Connection, source_id: MemoryId, related: &[MemoryId], now: i64) -> hive_core::Result<usize> {
    let edges = edges_for(source_id, related);
    for edge in &edges {
        rows::insert_relationship(conn, edge, now)?;
    }
    Ok(edges.len())
}
