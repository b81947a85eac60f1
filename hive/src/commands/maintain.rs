//! Periodic maintenance command.

use anyhow::{Context, Result};
use colored::Colorize;
use hive_memory::{MaintenanceReport, MaintenanceService};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::Config;
use crate::database::open_engine;

/// Execute maintain command.
pub async fn execute(once: bool, interval: Option<u64>, config: &Config) -> Result<()> {
    let engine = Arc::new(open_engine(config)?);

    let mut settings = config.maintenance.clone();
    if let Some(interval) = interval {
        settings.interval_secs = interval;
    }
    let service = MaintenanceService::new(engine, settings).context("Invalid maintenance settings")?;

    if once {
        let report = tokio::task::spawn_blocking(move || service.run_cycle(chrono::Utc::now()))
            .await
            .context("Maintenance cycle panicked")?;
        print_report(&report);
        return Ok(());
    }

    println!(
        "{} Maintenance every {}s (Ctrl-C to stop)",
        "▶".green(),
        service.config().interval_secs
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = tokio::spawn(service.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    let _ = shutdown_tx.send(true);

    let cycles = runner.await.context("Maintenance runner panicked")?;
    println!("{} Stopped after {} cycles", "■".yellow(), cycles);
    Ok(())
}

fn print_report(report: &MaintenanceReport) {
    println!("{}", "Maintenance Cycle".bold());
    println!("  Agents:       {}", report.agents);
    println!("  Consolidated: {}", report.consolidated.to_string().green());
    println!("  Forgotten:    {}", report.forgotten.to_string().yellow());
    if !report.errors.is_empty() {
        println!("  {}", format!("Errors ({})", report.errors.len()).red());
        for err in &report.errors {
            println!("    - {}", err);
        }
    }
}
