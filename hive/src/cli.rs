//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};
use hive_core::{MemoryCategory, MemoryType};
use std::path::PathBuf;

/// Hive operator CLI
///
/// Agent registry and hierarchical memory maintenance.
#[derive(Parser, Debug)]
#[command(name = "hive")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: <data dir>/config.toml)
    #[arg(long, global = true, env = "HIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true, env = "HIVE_DATABASE_PATH")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Agent registry (memory owners)
    Agent(AgentCommand),

    /// Hierarchical memory (store, retrieve, search, consolidate, decay)
    Memory(MemoryCommand),

    /// Run consolidation and decay for every agent
    Maintain {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Seconds between cycles (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct AgentCommand {
    #[command(subcommand)]
    pub action: AgentAction,
}

#[derive(Subcommand, Debug)]
pub enum AgentAction {
    /// Register an agent (no-op if it exists)
    Register {
        /// Agent name
        name: String,
    },

    /// List registered agents
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct MemoryCommand {
    #[command(subcommand)]
    pub action: MemoryAction,
}

#[derive(Subcommand, Debug)]
pub enum MemoryAction {
    /// Store a memory
    Store {
        /// Memory content
        content: String,

        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,

        /// Tier: working, episodic, semantic
        #[arg(short = 't', long = "type", default_value = "episodic")]
        memory_type: MemoryType,

        /// Category: conversation, task, knowledge, pattern, solution, context
        #[arg(short, long, default_value = "task")]
        category: MemoryCategory,

        /// Free-text context
        #[arg(long)]
        context: Option<String>,

        /// Tags for filtering
        #[arg(short = 'T', long = "tag", action = clap::ArgAction::Append)]
        tags: Vec<String>,

        /// Importance 0.0 - 1.0 (scored when omitted)
        #[arg(short, long)]
        importance: Option<f64>,

        /// Confidence 0.0 - 1.0 (default: 1.0)
        #[arg(long)]
        confidence: Option<f64>,

        /// Link to existing memory ids
        #[arg(short, long = "related", action = clap::ArgAction::Append)]
        related: Vec<i64>,
    },

    /// Retrieve memories ranked by importance
    Retrieve {
        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,

        /// Filter by tier
        #[arg(short = 't', long = "type")]
        memory_type: Option<MemoryType>,

        /// Filter by category
        #[arg(short, long)]
        category: Option<MemoryCategory>,

        /// Require every tag
        #[arg(short = 'T', long = "tag", action = clap::ArgAction::Append)]
        tags: Vec<String>,

        /// Maximum results (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum importance
        #[arg(short = 'm', long, default_value = "0.0")]
        min_importance: f64,

        /// Omit context from results
        #[arg(long)]
        no_context: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Search memory content and context
    Search {
        /// Whitespace-separated terms; any may match
        query: String,

        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,

        /// Filter by tier
        #[arg(short = 't', long = "type")]
        memory_type: Option<MemoryType>,

        /// Maximum results (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one memory without counting an access
    Show {
        /// Memory id
        id: i64,

        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List a memory's outgoing links
    Links {
        /// Memory id
        id: i64,

        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,
    },

    /// Promote important, frequently used episodic memories
    Consolidate {
        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,
    },

    /// Weaken old unimportant memories and forget the weakest
    Decay {
        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,

        /// Minimum age in days (default from config)
        #[arg(short, long)]
        days_old: Option<u32>,
    },

    /// Show memory statistics
    Stats {
        /// Owning agent
        #[arg(short, long, env = "HIVE_AGENT")]
        owner: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_store() {
        let cli = Cli::try_parse_from([
            "hive", "memory", "store", "fixed the build", "--owner", "coder", "--type", "semantic",
            "--category", "solution", "-T", "ci", "-T", "build", "--related", "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Memory(MemoryCommand {
                action:
                    MemoryAction::Store {
                        content,
                        owner,
                        memory_type,
                        category,
                        tags,
                        related,
                        importance,
                        ..
                    },
            }) => {
                assert_eq!(content, "fixed the build");
                assert_eq!(owner, "coder");
                assert_eq!(memory_type, MemoryType::Semantic);
                assert_eq!(category, MemoryCategory::Solution);
                assert_eq!(tags, vec!["ci", "build"]);
                assert_eq!(related, vec![4]);
                assert!(importance.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let result = Cli::try_parse_from([
            "hive", "memory", "retrieve", "--owner", "coder", "--type", "long_term",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_maintain_once() {
        let cli = Cli::try_parse_from(["hive", "maintain", "--once", "--interval", "30"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Maintain {
                once: true,
                interval: Some(30)
            }
        ));
    }
}
