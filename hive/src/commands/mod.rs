//! Command implementations for the hive CLI.
//!
//! Each submodule implements the logic for a command group.

pub mod agent;
pub mod maintain;
pub mod memory;
