//! Memory engine
//!
//! [`MemoryEngine`] is the entry point for every memory operation. Each
//! operation comes in two forms:
//!
//! - `try_*` returns a typed [`MemoryResult`]
//! - the plain form never fails: errors are logged and a sentinel comes back
//!   (`None`, an empty `Vec` or `0`)
//!
//! Each operation runs in a single SQLite transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hive_core::db::memory as rows;
use hive_core::types::{MemoryId, MemoryQueryFilter, MemoryType, NewMemoryRecord};
use hive_core::Database;
use tracing::{error, info, warn};

use crate::config::MemoryConfig;
use crate::error::{MemoryError, MemoryResult};
use crate::memory::{
    consolidation, decay, relationships, retrieval, score_importance, tokenize, AgentDirectory,
    MemoryMatcher, MemorySnapshot, MemoryStats, RelationshipView, RetrieveQuery, SearchQuery,
    StoreMemoryInput, SubstringMatcher,
};
use crate::utils::{now_utc, to_millis};

/// Hierarchical memory engine over a shared database handle
pub struct MemoryEngine {
    db: Arc<Database>,
    directory: Arc<dyn AgentDirectory>,
    matcher: Arc<dyn MemoryMatcher>,
    config: MemoryConfig,
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("db", &self.db)
            .field("matcher", &self.matcher.name())
            .field("config", &self.config)
            .finish()
    }
}

impl MemoryEngine {
    /// Create an engine that resolves owners through the database's agent table.
    pub fn new(db: Arc<Database>, config: MemoryConfig) -> MemoryResult<Self> {
        config.validate()?;
        Ok(Self {
            directory: db.clone(),
            db,
            matcher: Arc::new(SubstringMatcher),
            config,
        })
    }

    /// Resolve owners through another directory
    pub fn with_directory(mut self, directory: Arc<dyn AgentDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Swap the search matching strategy
    pub fn with_matcher(mut self, matcher: Arc<dyn MemoryMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    fn resolve_owner(&self, owner: &str) -> MemoryResult<String> {
        self.directory
            .resolve(owner)?
            .ok_or_else(|| MemoryError::OwnerNotFound(owner.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Store
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a memory, returning its id or `None` on failure.
    pub fn store_memory(&self, input: StoreMemoryInput) -> Option<MemoryId> {
        let owner = input.owner.clone();
        logged("store_memory", &owner, self.try_store_memory(input))
    }

    /// Store a memory.
    ///
    /// Importance is scored when absent. Content emptiness is not checked
    /// here; an explicit importance or confidence outside `[0, 1]` is.
    pub fn try_store_memory(&self, input: StoreMemoryInput) -> MemoryResult<MemoryId> {
        if let Some(importance) = input.importance {
            check_unit("importance", importance)?;
        }
        if let Some(confidence) = input.confidence {
            check_unit("confidence", confidence)?;
        }

        let agent_id = self.resolve_owner(&input.owner)?;
        let importance = input
            .importance
            .unwrap_or_else(|| score_importance(input.memory_type, input.memory_category, &input.content));
        let now = to_millis(now_utc());

        let record = NewMemoryRecord {
            agent_id,
            memory_type: input.memory_type,
            memory_category: input.memory_category,
            content: input.content,
            context: input.context,
            tags: input.tags,
            importance,
            confidence: input.confidence.unwrap_or(1.0),
            related_memories: input.related_memory_ids,
            extensions: input.extensions,
            created_at: now,
        };

        let (id, links) = self.db.with_transaction(|tx| -> hive_core::Result<_> {
            let id = rows::insert_memory(tx, &record)?;
            let links = relationships::link(tx, id, &record.related_memories, now)?;
            Ok((id, links))
        })?;

        info!(
            owner = %input.owner,
            memory_id = id,
            memory_type = %record.memory_type,
            importance,
            links,
            "Stored memory"
        );
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Retrieve & Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Filtered, ranked retrieval. Empty on failure.
    pub fn retrieve_memories(&self, query: &RetrieveQuery) -> Vec<MemorySnapshot> {
        logged("retrieve_memories", &query.owner, self.try_retrieve_memories(query)).unwrap_or_default()
    }

    /// Filtered, ranked retrieval; every returned memory counts as accessed.
    pub fn try_retrieve_memories(&self, query: &RetrieveQuery) -> MemoryResult<Vec<MemorySnapshot>> {
        let agent_id = self.resolve_owner(&query.owner)?;
        let filter = MemoryQueryFilter {
            agent_id,
            memory_type: query.memory_type,
            memory_category: query.memory_category,
            tags: query.tags.clone(),
            min_importance: Some(query.min_importance),
            limit: Some(query.limit.unwrap_or(self.config.default_limit)),
            ..Default::default()
        };
        let now = to_millis(now_utc());

        let records = self
            .db
            .with_transaction(|tx| retrieval::retrieve(tx, &filter, now))?;

        Ok(records
            .into_iter()
            .map(|record| MemorySnapshot::from_record(record, query.include_context))
            .collect())
    }

    /// Keyword search. Empty on failure.
    pub fn search_memories(&self, query: &SearchQuery) -> Vec<MemorySnapshot> {
        logged("search_memories", &query.owner, self.try_search_memories(query)).unwrap_or_default()
    }

    /// Keyword search over content and context; every hit counts as accessed.
    pub fn try_search_memories(&self, query: &SearchQuery) -> MemoryResult<Vec<MemorySnapshot>> {
        let agent_id = self.resolve_owner(&query.owner)?;
        let terms = tokenize(&query.query);
        let limit = query.limit.unwrap_or(self.config.default_limit);
        let now = to_millis(now_utc());

        let records = self.db.with_transaction(|tx| {
            retrieval::search(
                tx,
                &agent_id,
                query.memory_type,
                &terms,
                self.matcher.as_ref(),
                limit,
                now,
            )
        })?;

        Ok(records
            .into_iter()
            .map(|record| MemorySnapshot::from_record(record, true))
            .collect())
    }

    /// Read one memory without counting it as accessed.
    pub fn get_memory(&self, owner: &str, id: MemoryId) -> Option<MemorySnapshot> {
        logged("get_memory", owner, self.try_get_memory(owner, id))
    }

    pub fn try_get_memory(&self, owner: &str, id: MemoryId) -> MemoryResult<MemorySnapshot> {
        let agent_id = self.resolve_owner(owner)?;
        let record = self
            .db
            .with_transaction(|tx| rows::get_memory(tx, &agent_id, id))?
            .ok_or_else(|| MemoryError::MemoryNotFound {
                owner: owner.to_string(),
                id,
            })?;
        Ok(MemorySnapshot::from_record(record, true))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Promote eligible episodic memories now. Returns the count, 0 on failure.
    pub fn consolidate_memories(&self, owner: &str, memory_type: MemoryType) -> usize {
        logged(
            "consolidate_memories",
            owner,
            self.try_consolidate_memories(owner, memory_type, now_utc()),
        )
        .unwrap_or_default()
    }

    /// Promote eligible episodic memories as of `as_of`.
    ///
    /// Only `MemoryType::Episodic` is a valid source tier.
    pub fn try_consolidate_memories(
        &self,
        owner: &str,
        memory_type: MemoryType,
        as_of: DateTime<Utc>,
    ) -> MemoryResult<usize> {
        if memory_type != MemoryType::Episodic {
            return Err(MemoryError::validation(format!(
                "only episodic memories consolidate, got {memory_type}"
            )));
        }

        let agent_id = self.resolve_owner(owner)?;
        let count = self.db.with_transaction(|tx| {
            consolidation::consolidate(tx, &agent_id, &self.config.consolidation, as_of)
        })?;

        if count > 0 {
            info!(owner, count, "Consolidated episodic memories");
        }
        Ok(count)
    }

    /// Weaken and forget stale memories now. Returns the deleted count, 0 on failure.
    pub fn decay_memories(&self, owner: &str, days_old: u32) -> usize {
        logged(
            "decay_memories",
            owner,
            self.try_decay_memories(owner, days_old, now_utc()),
        )
        .unwrap_or_default()
    }

    /// Weaken memories older than `days_old` days as of `as_of`; delete those
    /// that fall below the floor. Returns the deleted count.
    pub fn try_decay_memories(&self, owner: &str, days_old: u32, as_of: DateTime<Utc>) -> MemoryResult<usize> {
        let agent_id = self.resolve_owner(owner)?;
        let forgotten = self
            .db
            .with_transaction(|tx| decay::decay(tx, &agent_id, days_old, &self.config.decay, as_of))?;

        if forgotten > 0 {
            info!(owner, count = forgotten, "Forgot decayed memories");
        }
        Ok(forgotten)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stats & Links
    // ─────────────────────────────────────────────────────────────────────────

    /// Aggregate counts for an owner, `None` on failure.
    pub fn get_memory_stats(&self, owner: &str) -> Option<MemoryStats> {
        logged("get_memory_stats", owner, self.try_get_memory_stats(owner))
    }

    pub fn try_get_memory_stats(&self, owner: &str) -> MemoryResult<MemoryStats> {
        let agent_id = self.resolve_owner(owner)?;
        let counts = self
            .db
            .with_transaction(|tx| rows::memory_counts(tx, &agent_id))?;

        Ok(MemoryStats {
            working_count: counts.working,
            episodic_count: counts.episodic,
            semantic_count: counts.semantic,
            total: counts.total(),
            avg_importance: (counts.mean_importance * 1000.0).round() / 1000.0,
        })
    }

    /// Outgoing links of one of the owner's memories. Empty on failure.
    pub fn relationships(&self, owner: &str, id: MemoryId) -> Vec<RelationshipView> {
        logged("relationships", owner, self.try_relationships(owner, id)).unwrap_or_default()
    }

    pub fn try_relationships(&self, owner: &str, id: MemoryId) -> MemoryResult<Vec<RelationshipView>> {
        let agent_id = self.resolve_owner(owner)?;
        let edges = self.db.with_transaction(|tx| -> MemoryResult<_> {
            if rows::get_memory(tx, &agent_id, id)?.is_none() {
                return Err(MemoryError::MemoryNotFound {
                    owner: owner.to_string(),
                    id,
                });
            }
            Ok(rows::list_relationships(tx, id)?)
        })?;
        Ok(edges.into_iter().map(RelationshipView::from).collect())
    }
}

fn check_unit(field: &str, value: f64) -> MemoryResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MemoryError::validation(format!("{field} must be within [0, 1], got {value}")))
    }
}

/// Collapse a result to `Option`, logging the error.
fn logged<T>(operation: &str, owner: &str, result: MemoryResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err @ (MemoryError::Storage(_) | MemoryError::Config(_))) => {
            error!(operation, owner, error = %err, "Memory operation failed");
            None
        }
        Err(err) => {
            warn!(operation, owner, error = %err, "Memory operation rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::types::MemoryCategory;

    fn setup() -> MemoryEngine {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.register_agent("coder").unwrap();
        MemoryEngine::new(db, MemoryConfig::default()).unwrap()
    }

    fn episodic(content: &str) -> StoreMemoryInput {
        StoreMemoryInput::new("coder", MemoryType::Episodic, MemoryCategory::Task, content)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let err = MemoryEngine::new(db, MemoryConfig::default().with_default_limit(0)).unwrap_err();
        assert!(matches!(err, MemoryError::Config(_)));
    }

    #[test]
    fn test_store_scores_when_importance_missing() {
        let engine = setup();
        let id = engine.store_memory(episodic(&"a".repeat(100))).unwrap();
        let memory = engine.get_memory("coder", id).unwrap();
        assert!((memory.importance - 0.5).abs() < 1e-9);
        assert_eq!(memory.confidence, 1.0);
        assert_eq!(memory.access_count, 0);
    }

    #[test]
    fn test_store_keeps_explicit_importance() {
        let engine = setup();
        let id = engine.store_memory(episodic("x").with_importance(0.9)).unwrap();
        assert_eq!(engine.get_memory("coder", id).unwrap().importance, 0.9);
    }

    #[test]
    fn test_store_rejects_out_of_range_values() {
        let engine = setup();
        let err = engine.try_store_memory(episodic("x").with_importance(1.2)).unwrap_err();
        assert!(err.is_validation());
        assert!(engine.store_memory(episodic("x").with_confidence(-0.1)).is_none());
        assert!(engine.store_memory(episodic("x").with_importance(f64::NAN)).is_none());
    }

    #[test]
    fn test_store_accepts_empty_content() {
        let engine = setup();
        let id = engine.store_memory(episodic("")).unwrap();
        assert_eq!(engine.get_memory("coder", id).unwrap().importance, 0.0);
    }

    #[test]
    fn test_unknown_owner_sentinels() {
        let engine = setup();
        let ghost = StoreMemoryInput::new("ghost", MemoryType::Working, MemoryCategory::Context, "x");
        assert!(engine.store_memory(ghost).is_none());
        assert!(engine.retrieve_memories(&RetrieveQuery::new("ghost")).is_empty());
        assert!(engine.search_memories(&SearchQuery::new("ghost", "x")).is_empty());
        assert_eq!(engine.consolidate_memories("ghost", MemoryType::Episodic), 0);
        assert_eq!(engine.decay_memories("ghost", 30), 0);
        assert!(engine.get_memory_stats("ghost").is_none());
        assert!(engine.get_memory("ghost", 1).is_none());
        assert!(engine.relationships("ghost", 1).is_empty());

        let err = engine.try_get_memory_stats("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_consolidate_rejects_non_episodic_source() {
        let engine = setup();
        let err = engine
            .try_consolidate_memories("coder", MemoryType::Working, now_utc())
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(engine.consolidate_memories("coder", MemoryType::Semantic), 0);
    }

    #[test]
    fn test_retrieve_uses_default_limit() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.register_agent("coder").unwrap();
        let engine = MemoryEngine::new(db, MemoryConfig::default().with_default_limit(2)).unwrap();
        for i in 0..4 {
            engine.store_memory(episodic(&format!("memory {i}"))).unwrap();
        }
        assert_eq!(engine.retrieve_memories(&RetrieveQuery::new("coder")).len(), 2);
        assert_eq!(engine.retrieve_memories(&RetrieveQuery::new("coder").limit(3)).len(), 3);
    }

    #[test]
    fn test_get_memory_hides_other_owners() {
        let engine = setup();
        engine.database().register_agent("reviewer").unwrap();
        let id = engine.store_memory(episodic("private")).unwrap();
        let err = engine.try_get_memory("reviewer", id).unwrap_err();
        assert!(matches!(err, MemoryError::MemoryNotFound { .. }));
    }

    struct NoMatch;

    impl MemoryMatcher for NoMatch {
        fn name(&self) -> &'static str {
            "none"
        }

        fn is_match(&self, _terms: &[String], _record: &hive_core::types::MemoryRecord) -> bool {
            false
        }
    }

    #[test]
    fn test_custom_matcher() {
        let engine = setup().with_matcher(Arc::new(NoMatch));
        engine.store_memory(episodic("findable")).unwrap();
        assert!(engine.search_memories(&SearchQuery::new("coder", "findable")).is_empty());
    }

    struct FixedDirectory;

    impl AgentDirectory for FixedDirectory {
        fn resolve(&self, _name: &str) -> hive_core::Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_custom_directory_fails_closed() {
        let engine = setup().with_directory(Arc::new(FixedDirectory));
        assert!(engine.store_memory(episodic("x")).is_none());
    }
}
