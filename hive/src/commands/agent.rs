//! Agent registry commands.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::{AgentAction, AgentCommand};
use crate::config::Config;
use crate::database::open_database;

/// Execute agent command.
pub fn execute(cmd: AgentCommand, config: &Config) -> Result<()> {
    let db = open_database(config)?;

    match cmd.action {
        AgentAction::Register { name } => {
            let agent = db
                .register_agent(&name)
                .with_context(|| format!("Failed to register agent {name:?}"))?;
            println!("{} Agent {} ready", "✓".green(), agent.name.cyan());
            println!("  ID: {}", agent.id.dimmed());
        }

        AgentAction::List { json } => {
            let agents = db.list_agents().context("Failed to list agents")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&agents)?);
                return Ok(());
            }

            if agents.is_empty() {
                println!("{}", "No agents registered".yellow());
                return Ok(());
            }

            println!("{}", format!("Agents ({})", agents.len()).bold());
            for agent in &agents {
                let created = chrono::DateTime::from_timestamp_millis(agent.created_at)
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("  {} {} {}", agent.name.cyan(), agent.id.dimmed(), created.dimmed());
            }
        }
    }

    Ok(())
}
