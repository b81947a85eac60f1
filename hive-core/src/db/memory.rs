//! Memory row operations.
//!
//! Every function takes a plain `&Connection` (a `Transaction` derefs to one)
//! so the engine can run several steps atomically.

use crate::error::Result;
use crate::types::{
    MemoryCounts, MemoryId, MemoryQueryFilter, MemoryRecord, MemoryRelationship, MemoryType,
    NewMemoryRecord, NewMemoryRelationship,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeMap, HashMap};

const MEMORY_COLUMNS: &str = "id, agent_id, memory_type, memory_category, content, context,
    importance, confidence, access_count, created_at, accessed_at, last_consolidated,
    related_memories_json, extensions_json";

/// Ranking used by every listing: importance, then recency of access.
const RANK_ORDER: &str = " ORDER BY importance DESC, accessed_at DESC, id DESC";

// ─────────────────────────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────────────────────────

/// Insert a memory row and its tags, returning the new id.
pub fn insert_memory(conn: &Connection, memory: &NewMemoryRecord) -> Result<MemoryId> {
    let related_json = serde_json::to_string(&memory.related_memories)?;
    let extensions_json = if memory.extensions.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&memory.extensions)?)
    };

    conn.execute(
        "INSERT INTO memories
         (agent_id, memory_type, memory_category, content, context, importance, confidence,
          access_count, created_at, accessed_at, last_consolidated,
          related_memories_json, extensions_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8, NULL, ?9, ?10)",
        params![
            memory.agent_id,
            memory.memory_type,
            memory.memory_category,
            memory.content,
            memory.context,
            memory.importance,
            memory.confidence,
            memory.created_at,
            related_json,
            extensions_json,
        ],
    )?;
    let id = conn.last_insert_rowid();

    let mut stmt = conn.prepare_cached("INSERT OR IGNORE INTO memory_tags (memory_id, tag) VALUES (?1, ?2)")?;
    for tag in &memory.tags {
        stmt.execute(params![id, tag])?;
    }

    Ok(id)
}

/// Append a relationship edge. Endpoints are not checked.
pub fn insert_relationship(conn: &Connection, edge: &NewMemoryRelationship, now: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO memory_relationships (source_id, target_id, relationship_type, strength, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![edge.source_id, edge.target_id, edge.relationship_type, edge.strength, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Bump access bookkeeping for one memory.
pub fn record_access(conn: &Connection, id: MemoryId, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE memories SET access_count = access_count + 1, accessed_at = ?2 WHERE id = ?1",
        params![id, now],
    )?;
    Ok(())
}

/// Stamp a memory as consolidated at `now`.
pub fn mark_consolidated(conn: &Connection, id: MemoryId, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE memories SET last_consolidated = ?2 WHERE id = ?1",
        params![id, now],
    )?;
    Ok(())
}

pub fn update_importance(conn: &Connection, id: MemoryId, importance: f64) -> Result<()> {
    conn.execute(
        "UPDATE memories SET importance = ?2 WHERE id = ?1",
        params![id, importance],
    )?;
    Ok(())
}

/// Delete a memory (tags cascade). Returns whether a row was removed.
pub fn delete_memory(conn: &Connection, id: MemoryId) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────────────────────────

/// List an agent's memories matching `filter`, best ranked first.
pub fn list_memories(conn: &Connection, filter: &MemoryQueryFilter) -> Result<Vec<MemoryRecord>> {
    let mut sql = format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE agent_id = ?");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(filter.agent_id.clone())];

    if let Some(memory_type) = filter.memory_type {
        sql.push_str(" AND memory_type = ?");
        params_vec.push(Box::new(memory_type));
    }

    if let Some(category) = filter.memory_category {
        sql.push_str(" AND memory_category = ?");
        params_vec.push(Box::new(category));
    }

    if let Some(min_importance) = filter.min_importance {
        sql.push_str(" AND importance >= ?");
        params_vec.push(Box::new(min_importance));
    }

    let mut tags: Vec<&str> = filter.tags.iter().map(|t| t.as_str()).collect();
    tags.sort_unstable();
    tags.dedup();
    if !tags.is_empty() {
        sql.push_str(&format!(
            " AND id IN (SELECT memory_id FROM memory_tags WHERE tag IN ({})
              GROUP BY memory_id HAVING COUNT(DISTINCT tag) = ?)",
            tags.iter().map(|_| "?").collect::<Vec<_>>().join(",")
        ));
        for tag in &tags {
            params_vec.push(Box::new(tag.to_string()));
        }
        params_vec.push(Box::new(tags.len() as i64));
    }

    if !filter.text_terms.is_empty() {
        let clauses: Vec<&str> = filter
            .text_terms
            .iter()
            .map(|_| "instr(lower(content), ?) > 0 OR instr(lower(COALESCE(context, '')), ?) > 0")
            .collect();
        sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
        for term in &filter.text_terms {
            params_vec.push(Box::new(term.clone()));
            params_vec.push(Box::new(term.clone()));
        }
    }

    sql.push_str(RANK_ORDER);

    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit.min(i64::MAX as usize) as i64));
    }

    let param_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    query_records(conn, &sql, param_refs.as_slice())
}

/// Get one of an agent's memories by id.
pub fn get_memory(conn: &Connection, agent_id: &str, id: MemoryId) -> Result<Option<MemoryRecord>> {
    let sql = format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1 AND agent_id = ?2");
    let record = conn
        .query_row(&sql, params![id, agent_id], map_memory_row)
        .optional()?;

    match record {
        Some(mut record) => {
            record.tags = load_tags(conn, record.id)?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

/// Memories of `memory_type` never consolidated or last consolidated before `cutoff`.
pub fn consolidation_candidates(
    conn: &Connection,
    agent_id: &str,
    memory_type: MemoryType,
    cutoff: i64,
) -> Result<Vec<MemoryRecord>> {
    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories
         WHERE agent_id = ?1 AND memory_type = ?2
           AND (last_consolidated IS NULL OR last_consolidated < ?3)
         ORDER BY id"
    );
    query_records(conn, &sql, params![agent_id, memory_type, cutoff])
}

/// Memories created before `created_before` that are still weak and rarely used.
pub fn decay_candidates(
    conn: &Connection,
    agent_id: &str,
    created_before: i64,
    importance_below: f64,
    access_count_below: i64,
) -> Result<Vec<MemoryRecord>> {
    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories
         WHERE agent_id = ?1 AND created_at < ?2 AND importance < ?3 AND access_count < ?4
         ORDER BY id"
    );
    query_records(
        conn,
        &sql,
        params![agent_id, created_before, importance_below, access_count_below],
    )
}

/// Per-type counts and mean importance for one agent.
pub fn memory_counts(conn: &Connection, agent_id: &str) -> Result<MemoryCounts> {
    let mut counts = MemoryCounts::default();

    let mut stmt = conn.prepare(
        "SELECT memory_type, COUNT(*) FROM memories WHERE agent_id = ?1 GROUP BY memory_type",
    )?;
    let rows = stmt.query_map(params![agent_id], |row| {
        Ok((row.get::<_, MemoryType>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (memory_type, count) = row?;
        match memory_type {
            MemoryType::Working => counts.working = count,
            MemoryType::Episodic => counts.episodic = count,
            MemoryType::Semantic => counts.semantic = count,
        }
    }

    let mean: Option<f64> = conn.query_row(
        "SELECT AVG(importance) FROM memories WHERE agent_id = ?1",
        params![agent_id],
        |row| row.get(0),
    )?;
    counts.mean_importance = mean.unwrap_or(0.0);

    Ok(counts)
}

/// Outgoing edges of a memory, flagging targets that no longer exist.
pub fn list_relationships(conn: &Connection, source_id: MemoryId) -> Result<Vec<MemoryRelationship>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.source_id, r.target_id, r.relationship_type, r.strength, r.created_at,
                EXISTS (SELECT 1 FROM memories m WHERE m.id = r.target_id)
         FROM memory_relationships r
         WHERE r.source_id = ?1
         ORDER BY r.id",
    )?;
    let edges = stmt
        .query_map(params![source_id], |row| {
            Ok(MemoryRelationship {
                id: row.get(0)?,
                source_id: row.get(1)?,
                target_id: row.get(2)?,
                relationship_type: row.get(3)?,
                strength: row.get(4)?,
                created_at: row.get(5)?,
                target_exists: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(edges)
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn query_records<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<MemoryRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let mut records = stmt
        .query_map(params, map_memory_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    attach_tags(conn, &mut records)?;
    Ok(records)
}

/// Bound parameters per tag lookup, well under SQLite's variable limit
const TAG_BATCH: usize = 500;

/// Load tags for many records with one query per batch.
fn attach_tags(conn: &Connection, records: &mut [MemoryRecord]) -> Result<()> {
    for batch in records.chunks_mut(TAG_BATCH) {
        let ids: Vec<MemoryId> = batch.iter().map(|r| r.id).collect();
        let sql = format!(
            "SELECT memory_id, tag FROM memory_tags WHERE memory_id IN ({}) ORDER BY memory_id, tag",
            ids.iter().map(|_| "?").collect::<Vec<_>>().join(",")
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut by_id: HashMap<MemoryId, Vec<String>> = HashMap::new();
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok((row.get::<_, MemoryId>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, tag) = row?;
            by_id.entry(id).or_default().push(tag);
        }

        for record in batch.iter_mut() {
            record.tags = by_id.remove(&record.id).unwrap_or_default();
        }
    }
    Ok(())
}

fn load_tags(conn: &Connection, memory_id: MemoryId) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached("SELECT tag FROM memory_tags WHERE memory_id = ?1 ORDER BY tag")?;
    let tags = stmt
        .query_map(params![memory_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(tags)
}

fn map_memory_row(row: &rusqlite::Row) -> rusqlite::Result<MemoryRecord> {
    let related_json: String = row.get(12)?;
    let related_memories = serde_json::from_str(&related_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?;

    let extensions = match row.get::<_, Option<String>>(13)? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(13, Type::Text, Box::new(e)))?,
        None => BTreeMap::new(),
    };

    Ok(MemoryRecord {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        memory_type: row.get(2)?,
        memory_category: row.get(3)?,
        content: row.get(4)?,
        context: row.get(5)?,
        tags: Vec::new(),
        importance: row.get(6)?,
        confidence: row.get(7)?,
        access_count: row.get(8)?,
        created_at: row.get(9)?,
        accessed_at: row.get(10)?,
        last_consolidated: row.get(11)?,
        related_memories,
        extensions,
    })
}
