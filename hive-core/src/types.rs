//! Shared types for hive storage.
//!
//! Row structs mirror the SQLite tables one-to-one. Timestamps are unix
//! milliseconds; conversion to `DateTime<Utc>` happens in the memory engine.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Memory identifier (SQLite rowid).
pub type MemoryId = i64;

/// Relationship type written for every link created at store time.
pub const RELATED: &str = "related";

// ─────────────────────────────────────────────────────────────────────────────
// Memory Type & Category
// ─────────────────────────────────────────────────────────────────────────────

/// Memory tier in the working → episodic → semantic hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Working,
    Episodic,
    Semantic,
}

impl MemoryType {
    pub const ALL: [MemoryType; 3] = [MemoryType::Working, MemoryType::Episodic, MemoryType::Semantic];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Working => "working",
            MemoryType::Episodic => "episodic",
            MemoryType::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "working" => Ok(MemoryType::Working),
            "episodic" => Ok(MemoryType::Episodic),
            "semantic" => Ok(MemoryType::Semantic),
            _ => Err(format!("Invalid memory type: {}", s)),
        }
    }
}

/// What a memory is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Conversation,
    Task,
    Knowledge,
    Pattern,
    Solution,
    Context,
}

impl MemoryCategory {
    pub const ALL: [MemoryCategory; 6] = [
        MemoryCategory::Conversation,
        MemoryCategory::Task,
        MemoryCategory::Knowledge,
        MemoryCategory::Pattern,
        MemoryCategory::Solution,
        MemoryCategory::Context,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Conversation => "conversation",
            MemoryCategory::Task => "task",
            MemoryCategory::Knowledge => "knowledge",
            MemoryCategory::Pattern => "pattern",
            MemoryCategory::Solution => "solution",
            MemoryCategory::Context => "context",
        }
    }
}

impl std::fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conversation" => Ok(MemoryCategory::Conversation),
            "task" => Ok(MemoryCategory::Task),
            "knowledge" => Ok(MemoryCategory::Knowledge),
            "pattern" => Ok(MemoryCategory::Pattern),
            "solution" => Ok(MemoryCategory::Solution),
            "context" => Ok(MemoryCategory::Context),
            _ => Err(format!("Invalid memory category: {}", s)),
        }
    }
}

macro_rules! sql_text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse::<$ty>()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

sql_text_enum!(MemoryType);
sql_text_enum!(MemoryCategory);

// ─────────────────────────────────────────────────────────────────────────────
// Agents
// ─────────────────────────────────────────────────────────────────────────────

/// Registered agent (memory owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Memories
// ─────────────────────────────────────────────────────────────────────────────

/// Stored memory row with its tags attached
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub id: MemoryId,
    pub agent_id: String,
    pub memory_type: MemoryType,
    pub memory_category: MemoryCategory,
    pub content: String,
    pub context: Option<String>,
    /// Sorted, unique.
    pub tags: Vec<String>,
    pub importance: f64,
    pub confidence: f64,
    pub access_count: i64,
    pub created_at: i64,
    pub accessed_at: i64,
    pub last_consolidated: Option<i64>,
    pub related_memories: Vec<MemoryId>,
    pub extensions: BTreeMap<String, serde_json::Value>,
}

/// Input for creating a new memory row
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemoryRecord {
    pub agent_id: String,
    pub memory_type: MemoryType,
    pub memory_category: MemoryCategory,
    pub content: String,
    pub context: Option<String>,
    pub tags: Vec<String>,
    pub importance: f64,
    pub confidence: f64,
    pub related_memories: Vec<MemoryId>,
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// Also used as the initial `accessed_at`.
    pub created_at: i64,
}

/// Filter for listing an agent's memories
#[derive(Debug, Clone, Default)]
pub struct MemoryQueryFilter {
    pub agent_id: String,
    pub memory_type: Option<MemoryType>,
    pub memory_category: Option<MemoryCategory>,
    /// Every tag must be present.
    pub tags: Vec<String>,
    pub min_importance: Option<f64>,
    /// Lower-cased terms; any one appearing in content or context matches.
    /// Matching uses SQLite `lower()`, which folds ASCII only.
    pub text_terms: Vec<String>,
    pub limit: Option<usize>,
}

impl MemoryQueryFilter {
    pub fn for_agent(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Default::default()
        }
    }
}

/// Per-type counts and mean importance for one agent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryCounts {
    pub working: i64,
    pub episodic: i64,
    pub semantic: i64,
    /// Unrounded mean over all of the agent's memories; 0.0 when none.
    pub mean_importance: f64,
}

impl MemoryCounts {
    pub fn total(&self) -> i64 {
        self.working + self.episodic + self.semantic
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Relationships
// ─────────────────────────────────────────────────────────────────────────────

/// Directed, typed edge between two memories. Either end may dangle.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRelationship {
    pub id: i64,
    pub source_id: MemoryId,
    pub target_id: MemoryId,
    pub relationship_type: String,
    pub strength: f64,
    pub created_at: i64,
    /// Whether `target_id` still names a stored memory.
    pub target_exists: bool,
}

/// Input for a new edge
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemoryRelationship {
    pub source_id: MemoryId,
    pub target_id: MemoryId,
    pub relationship_type: String,
    pub strength: f64,
}

impl NewMemoryRelationship {
    /// Default `related` edge at full strength.
    pub fn related(source_id: MemoryId, target_id: MemoryId) -> Self {
        Self {
            source_id,
            target_id,
            relationship_type: RELATED.to_string(),
            strength: 1.0,
        }
    }
}
