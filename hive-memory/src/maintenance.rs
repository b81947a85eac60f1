//! Periodic memory maintenance.
//!
//! Runs consolidation and decay for every registered agent, either once
//! ([`MaintenanceService::run_cycle`]) or on an interval until shutdown is
//! signalled ([`MaintenanceService::run`]).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hive_core::types::MemoryType;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::MaintenanceConfig;
use crate::engine::MemoryEngine;
use crate::error::MemoryResult;
use crate::utils::now_utc;

/// Outcome of one maintenance cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaintenanceReport {
    /// Agents visited
    pub agents: usize,
    /// New semantic memories created
    pub consolidated: usize,
    /// Memories deleted by decay
    pub forgotten: usize,
    /// One message per failed agent step
    pub errors: Vec<String>,
}

impl MaintenanceReport {
    pub fn has_changes(&self) -> bool {
        self.consolidated > 0 || self.forgotten > 0
    }
}

/// Drives consolidation and decay across all agents
#[derive(Debug, Clone)]
pub struct MaintenanceService {
    engine: Arc<MemoryEngine>,
    config: MaintenanceConfig,
}

impl MaintenanceService {
    pub fn new(engine: Arc<MemoryEngine>, config: MaintenanceConfig) -> MemoryResult<Self> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    /// Run one cycle as of `as_of`. Per-agent failures are collected, not fatal.
    pub fn run_cycle(&self, as_of: DateTime<Utc>) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        let agents = match self.engine.database().list_agents() {
            Ok(agents) => agents,
            Err(err) => {
                error!(error = %err, "Failed to list agents for maintenance");
                report.errors.push(format!("list agents: {err}"));
                return report;
            }
        };

        for agent in &agents {
            report.agents += 1;

            if self.config.consolidate {
                match self
                    .engine
                    .try_consolidate_memories(&agent.name, MemoryType::Episodic, as_of)
                {
                    Ok(count) => report.consolidated += count,
                    Err(err) => {
                        warn!(agent = %agent.name, error = %err, "Consolidation failed");
                        report.errors.push(format!("{}: consolidate: {err}", agent.name));
                    }
                }
            }

            if self.config.decay {
                match self
                    .engine
                    .try_decay_memories(&agent.name, self.config.decay_days_old, as_of)
                {
                    Ok(count) => report.forgotten += count,
                    Err(err) => {
                        warn!(agent = %agent.name, error = %err, "Decay failed");
                        report.errors.push(format!("{}: decay: {err}", agent.name));
                    }
                }
            }
        }

        info!(
            agents = report.agents,
            consolidated = report.consolidated,
            forgotten = report.forgotten,
            errors = report.errors.len(),
            "Maintenance cycle complete"
        );
        report
    }

    /// Run cycles every `interval_secs` until `shutdown` flips to `true`
    /// (or its sender is dropped). The first cycle runs immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut cycles = 0;

        info!(interval_secs = self.config.interval_secs, "Maintenance runner started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let service = self.clone();
                    match tokio::task::spawn_blocking(move || service.run_cycle(now_utc())).await {
                        Ok(_) => cycles += 1,
                        Err(err) => error!(error = %err, "Maintenance cycle panicked"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(cycles, "Maintenance runner stopped");
        cycles
    }
}
