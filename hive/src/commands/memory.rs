//! Memory commands for the hierarchical memory engine.
//!
//! Memory tiers:
//! - Working: scratch context for the current task
//! - Episodic: what happened, consolidated when important and reused
//! - Semantic: learned knowledge derived from episodes

use anyhow::{bail, Context, Result};
use colored::Colorize;
use hive_core::MemoryType;
use hive_memory::{MemoryEngine, MemorySnapshot, RetrieveQuery, SearchQuery, StoreMemoryInput};

use crate::cli::{MemoryAction, MemoryCommand};
use crate::config::Config;
use crate::database::open_engine;

/// Execute memory command.
pub fn execute(cmd: MemoryCommand, config: &Config) -> Result<()> {
    let engine = open_engine(config)?;

    match cmd.action {
        MemoryAction::Store {
            content,
            owner,
            memory_type,
            category,
            context,
            tags,
            importance,
            confidence,
            related,
        } => {
            if content.trim().is_empty() {
                bail!("Memory content must not be empty");
            }

            let mut input = StoreMemoryInput::new(&owner, memory_type, category, content)
                .with_tags(tags)
                .with_related(related);
            input.context = context;
            input.importance = importance;
            input.confidence = confidence;
            store(&engine, input)
        }

        MemoryAction::Retrieve {
            owner,
            memory_type,
            category,
            tags,
            limit,
            min_importance,
            no_context,
            json,
        } => {
            let query = RetrieveQuery {
                owner,
                memory_type,
                memory_category: category,
                tags,
                limit,
                min_importance,
                include_context: !no_context,
            };
            let memories = engine
                .try_retrieve_memories(&query)
                .context("Failed to retrieve memories")?;
            print_memories(&memories, json)
        }

        MemoryAction::Search {
            query,
            owner,
            memory_type,
            limit,
            json,
        } => {
            let query = SearchQuery {
                owner,
                query,
                memory_type,
                limit,
            };
            let memories = engine
                .try_search_memories(&query)
                .context("Failed to search memories")?;
            print_memories(&memories, json)
        }

        MemoryAction::Show { id, owner, json } => {
            let memory = engine
                .try_get_memory(&owner, id)
                .with_context(|| format!("Failed to load memory {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&memory)?);
            } else {
                print_memory(1, &memory);
            }
            Ok(())
        }

        MemoryAction::Links { id, owner } => {
            let links = engine
                .try_relationships(&owner, id)
                .with_context(|| format!("Failed to load links of memory {id}"))?;
            if links.is_empty() {
                println!("{}", "No links".yellow());
                return Ok(());
            }
            for link in &links {
                let target = if link.target_exists {
                    link.target_id.to_string().cyan()
                } else {
                    format!("{} (forgotten)", link.target_id).dimmed()
                };
                println!(
                    "  {} {} {} [{:.2}]",
                    link.source_id.to_string().cyan(),
                    format!("-{}->", link.relationship_type).dimmed(),
                    target,
                    link.strength
                );
            }
            Ok(())
        }

        MemoryAction::Consolidate { owner } => {
            let count = engine
                .try_consolidate_memories(&owner, MemoryType::Episodic, chrono::Utc::now())
                .context("Failed to consolidate memories")?;
            println!("{} Consolidated {} episodic memories", "✓".green(), count);
            Ok(())
        }

        MemoryAction::Decay { owner, days_old } => {
            let days_old = days_old.unwrap_or(config.memory.decay.default_days_old);
            let count = engine
                .try_decay_memories(&owner, days_old, chrono::Utc::now())
                .context("Failed to decay memories")?;
            println!(
                "{} Forgot {} memories older than {} days",
                "✓".green(),
                count,
                days_old
            );
            Ok(())
        }

        MemoryAction::Stats { owner, json } => {
            let stats = engine
                .try_get_memory_stats(&owner)
                .context("Failed to get memory stats")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!("{}", format!("Memory Statistics: {owner}").bold());
            println!("  {} {}", "Working:".cyan(), stats.working_count);
            println!("  {} {}", "Episodic:".yellow(), stats.episodic_count);
            println!("  {} {}", "Semantic:".green(), stats.semantic_count);
            println!("  {} {}", "Total:".bold(), stats.total);
            println!("  Avg importance: {:.3}", stats.avg_importance);
            Ok(())
        }
    }
}

fn store(engine: &MemoryEngine, input: StoreMemoryInput) -> Result<()> {
    let memory_type = input.memory_type;
    let tags = input.tags.clone();
    let id = engine
        .try_store_memory(input)
        .context("Failed to store memory")?;

    println!("{} Stored in {} memory", "✓".green(), memory_type.to_string().cyan());
    println!("  ID: {}", id);
    if !tags.is_empty() {
        println!("  Tags: {}", tags.join(", "));
    }
    Ok(())
}

fn print_memories(memories: &[MemorySnapshot], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(memories)?);
        return Ok(());
    }

    if memories.is_empty() {
        println!("{}", "No memories found".yellow());
        return Ok(());
    }

    for (index, memory) in memories.iter().enumerate() {
        print_memory(index + 1, memory);
    }
    Ok(())
}

/// Print a memory in human-readable form.
fn print_memory(index: usize, memory: &MemorySnapshot) {
    let tier_color = match memory.memory_type {
        MemoryType::Working => "cyan",
        MemoryType::Episodic => "yellow",
        MemoryType::Semantic => "green",
    };

    println!(
        "  {}. #{} [{}] <{}>",
        index,
        memory.id.to_string().cyan(),
        memory.memory_type.to_string().color(tier_color),
        memory.memory_category.to_string().dimmed()
    );

    // Truncate content for display
    let content: String = if memory.content.chars().count() > 100 {
        format!("{}...", memory.content.chars().take(100).collect::<String>())
    } else {
        memory.content.clone()
    };
    println!("     {}", content);

    if let Some(ref context) = memory.context {
        println!("     {} {}", "Context:".dimmed(), context);
    }

    println!(
        "     Importance: {:.2}  Confidence: {:.2}  Accessed: {}x",
        memory.importance, memory.confidence, memory.access_count
    );

    if !memory.tags.is_empty() {
        println!("     Tags: {}", memory.tags.join(", ").dimmed());
    }
}
