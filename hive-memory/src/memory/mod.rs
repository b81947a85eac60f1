//! Hierarchical memory for agents.
//!
//! Three tiers, each memory owned by exactly one agent:
//!
//! - **Working memory**: scratch context for the task at hand
//! - **Episodic memory**: things that happened (task runs, conversations)
//! - **Semantic memory**: distilled knowledge promoted from episodes
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          MemoryEngine                            │
//! │                                                                  │
//! │  store ──▶ scoring ──▶ ┌──────────┐   ┌──────────┐   ┌──────────┐ │
//! │                       │ Working  │   │ Episodic │──▶│ Semantic │ │
//! │                       └──────────┘   └──────────┘   └──────────┘ │
//! │                              consolidation (new linked record)  │
//! │                                                                  │
//! │  retrieve / search ──▶ rank ──▶ touch (access_count, accessed)   │
//! │  decay ──▶ weaken ×0.8 ──▶ forget below 0.1                      │
//! │                                                                  │
//! │                  hive_core::Database (SQLite)                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod consolidation;
pub mod decay;
pub mod relationships;
pub mod retrieval;
pub mod scoring;
pub mod traits;
pub mod types;

pub use consolidation::{consolidated_content, derive_semantic, should_consolidate};
pub use decay::{decay_step, DecayOutcome};
pub use retrieval::{tokenize, SubstringMatcher};
pub use scoring::score_importance;
pub use traits::{AgentDirectory, MemoryMatcher};
pub use types::*;
