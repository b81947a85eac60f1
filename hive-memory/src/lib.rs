//! Hive memory engine
//!
//! Per-agent hierarchical memory on top of `hive-core` storage:
//!
//! - **memory** - scoring, retrieval/search, consolidation, decay, relationships
//! - **engine** - [`MemoryEngine`], the entry point for every operation
//! - **maintenance** - periodic consolidation and decay across all agents
//! - **config** - thresholds and runner settings
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hive_core::{Database, MemoryCategory, MemoryType};
//! use hive_memory::{MemoryConfig, MemoryEngine, RetrieveQuery, StoreMemoryInput};
//!
//! fn example() -> hive_memory::MemoryResult<()> {
//!     let db = Arc::new(Database::open_path(std::path::Path::new("hive.db"))?);
//!     db.register_agent("coder")?;
//!     let engine = MemoryEngine::new(db, MemoryConfig::default())?;
//!
//!     engine.store_memory(
//!         StoreMemoryInput::new("coder", MemoryType::Episodic, MemoryCategory::Solution, "Pinned the toolchain to fix CI")
//!             .with_tags(["ci"]),
//!     );
//!
//!     for memory in engine.retrieve_memories(&RetrieveQuery::new("coder").tags(["ci"])) {
//!         println!("{} ({:.2})", memory.content, memory.importance);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod maintenance;
pub mod memory;
pub mod utils;

pub use config::{ConfigValidationError, ConsolidationPolicy, DecayPolicy, MaintenanceConfig, MemoryConfig};
pub use engine::MemoryEngine;
pub use error::{MemoryError, MemoryResult};
pub use maintenance::{MaintenanceReport, MaintenanceService};
pub use memory::{
    AgentDirectory, MemoryMatcher, MemorySnapshot, MemoryStats, RelationshipView, RetrieveQuery,
    SearchQuery, StoreMemoryInput, SubstringMatcher,
};
