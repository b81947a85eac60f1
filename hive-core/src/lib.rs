//! hive-core - Core library for Hive
//!
//! Persistence shared by the memory engine and the `hive` CLI:
//!
//! - **db**: SQLite access (agents, memories, tags, relationships)
//! - **types**: Row types and the memory type/category enums
//! - **error**: Typed storage errors

pub mod db;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use types::{MemoryCategory, MemoryId, MemoryType};
