//! Memory engine input and output types.

use chrono::{DateTime, Utc};
use hive_core::types::{MemoryCategory, MemoryId, MemoryRecord, MemoryRelationship, MemoryType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::from_millis;

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// Input for `store_memory`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMemoryInput {
    /// Owning agent's name
    pub owner: String,
    pub memory_type: MemoryType,
    pub memory_category: MemoryCategory,
    pub content: String,
    pub context: Option<String>,
    pub tags: Vec<String>,
    /// Scored from type, category and length when absent
    pub importance: Option<f64>,
    /// Defaults to 1.0
    pub confidence: Option<f64>,
    /// One `related` edge is written to each id
    pub related_memory_ids: Vec<MemoryId>,
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl StoreMemoryInput {
    pub fn new(
        owner: impl Into<String>,
        memory_type: MemoryType,
        memory_category: MemoryCategory,
        content: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            memory_type,
            memory_category,
            content: content.into(),
            context: None,
            tags: Vec::new(),
            importance: None,
            confidence: None,
            related_memory_ids: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_related(mut self, ids: impl IntoIterator<Item = MemoryId>) -> Self {
        self.related_memory_ids = ids.into_iter().collect();
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

/// Filtered, ranked retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieveQuery {
    pub owner: String,
    pub memory_type: Option<MemoryType>,
    pub memory_category: Option<MemoryCategory>,
    /// Every tag must be present
    pub tags: Vec<String>,
    /// Falls back to the engine's default limit
    pub limit: Option<usize>,
    pub min_importance: f64,
    pub include_context: bool,
}

impl RetrieveQuery {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            memory_type: None,
            memory_category: None,
            tags: Vec::new(),
            limit: None,
            min_importance: 0.0,
            include_context: true,
        }
    }

    pub fn memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    pub fn category(mut self, category: MemoryCategory) -> Self {
        self.memory_category = Some(category);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn min_importance(mut self, min_importance: f64) -> Self {
        self.min_importance = min_importance;
        self
    }

    pub fn include_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }
}

/// Keyword search over content and context
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub owner: String,
    pub query: String,
    pub memory_type: Option<MemoryType>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(owner: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            query: query.into(),
            memory_type: None,
            limit: None,
        }
    }

    pub fn memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────────────────

/// Point-in-time view of a memory handed back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub id: MemoryId,
    pub memory_type: MemoryType,
    pub memory_category: MemoryCategory,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub tags: Vec<String>,
    pub importance: f64,
    pub confidence: f64,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
    pub last_consolidated: Option<DateTime<Utc>>,
    pub related_memories: Vec<MemoryId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl MemorySnapshot {
    pub fn from_record(record: MemoryRecord, include_context: bool) -> Self {
        Self {
            id: record.id,
            memory_type: record.memory_type,
            memory_category: record.memory_category,
            content: record.content,
            context: if include_context { record.context } else { None },
            tags: record.tags,
            importance: record.importance,
            confidence: record.confidence,
            access_count: record.access_count,
            created_at: from_millis(record.created_at),
            accessed_at: from_millis(record.accessed_at),
            last_consolidated: record.last_consolidated.map(from_millis),
            related_memories: record.related_memories,
            extensions: record.extensions,
        }
    }
}

/// Per-owner aggregate counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub working_count: i64,
    pub episodic_count: i64,
    pub semantic_count: i64,
    pub total: i64,
    /// Rounded to 3 decimal places
    pub avg_importance: f64,
}

/// Outgoing link of a memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipView {
    pub source_id: MemoryId,
    pub target_id: MemoryId,
    pub relationship_type: String,
    pub strength: f64,
    pub created_at: DateTime<Utc>,
    /// False once the target has been forgotten (or never existed)
    pub target_exists: bool,
}

impl From<MemoryRelationship> for RelationshipView {
    fn from(edge: MemoryRelationship) -> Self {
        Self {
            source_id: edge.source_id,
            target_id: edge.target_id,
            relationship_type: edge.relationship_type,
            strength: edge.strength,
            created_at: from_millis(edge.created_at),
            target_exists: edge.target_exists,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MemoryRecord {
        MemoryRecord {
            id: 3,
            agent_id: "a".into(),
            memory_type: MemoryType::Episodic,
            memory_category: MemoryCategory::Task,
            content: "ran migrations".into(),
            context: Some("release 1.2".into()),
            tags: vec!["db".into()],
            importance: 0.4,
            confidence: 1.0,
            access_count: 2,
            created_at: 1_700_000_000_000,
            accessed_at: 1_700_000_100_000,
            last_consolidated: None,
            related_memories: vec![1],
            extensions: BTreeMap::new(),
        }
    }

    #[test]
    fn test_snapshot_context_toggle() {
        let with = MemorySnapshot::from_record(record(), true);
        assert_eq!(with.context.as_deref(), Some("release 1.2"));

        let without = MemorySnapshot::from_record(record(), false);
        assert!(without.context.is_none());
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("context").is_none());
        assert!(json.get("extensions").is_none());
        assert_eq!(json["memory_type"], "episodic");
    }

    #[test]
    fn test_snapshot_timestamps() {
        let snap = MemorySnapshot::from_record(record(), true);
        assert_eq!(snap.created_at.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(snap.accessed_at.timestamp_millis(), 1_700_000_100_000);
        assert!(snap.last_consolidated.is_none());
    }

    #[test]
    fn test_store_input_builder() {
        let input = StoreMemoryInput::new("coder", MemoryType::Working, MemoryCategory::Context, "scratch")
            .with_context("ticket 12")
            .with_tags(["a", "b"])
            .with_importance(0.3)
            .with_related([4, 5])
            .with_extension("source", serde_json::json!("chat"));
        assert_eq!(input.tags, vec!["a", "b"]);
        assert_eq!(input.importance, Some(0.3));
        assert!(input.confidence.is_none());
        assert_eq!(input.related_memory_ids, vec![4, 5]);
        assert_eq!(input.extensions.len(), 1);
    }

    #[test]
    fn test_retrieve_query_defaults() {
        let query = RetrieveQuery::new("coder");
        assert!(query.include_context);
        assert_eq!(query.min_importance, 0.0);
        assert!(query.limit.is_none());
    }
}
