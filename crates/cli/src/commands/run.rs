//! Paper-mode agent run.
//!
//! Registers the configured strategies, starts the evaluation scheduler with
//! config-backed providers and runs until Ctrl+C or a tick limit.

use crate::commands::load_config;
use crate::paper;
use anyhow::{Context, Result};
use clap::Args;
use defi_agent_orchestrator::StrategyEngine;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Arguments for the run command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/agent.toml")]
    pub config: PathBuf,

    /// Profile overlay (`<config>.<profile>.toml`)
    #[arg(long)]
    pub profile: Option<String>,

    /// Stop after this many scheduler ticks
    #[arg(long)]
    pub ticks: Option<u64>,
}

/// Runs the agent until interrupted.
///
/// # Errors
/// Returns an error if configuration fails to load, a configured strategy is
/// rejected, or the scheduler cannot start.
pub async fn run_agent(args: RunArgs) -> Result<()> {
    let config = load_config(&args.config, args.profile.as_deref())?;
    let (collaborators, execution) = paper::collaborators(&config.market);
    let engine = StrategyEngine::new(&config, collaborators);

    let registered = engine
        .register_configured(&config)
        .await
        .context("Failed to register configured strategies")?;
    if registered == 0 {
        tracing::warn!("No strategies configured, scheduler will idle");
    }

    let shutdown = CancellationToken::new();
    engine.start(&shutdown)?;
    tracing::info!(
        strategies = registered,
        interval_secs = config.scheduler.interval_secs,
        "Agent running in paper mode"
    );

    match args.ticks {
        Some(limit) => {
            let mut poll = tokio::time::interval(Duration::from_millis(250));
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received Ctrl+C, shutting down");
                        break;
                    }
                    _ = poll.tick() => {
                        if engine.stats().ticks >= limit {
                            tracing::info!("Reached {} ticks, shutting down", limit);
                            break;
                        }
                    }
                }
            }
        }
        None => {
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl+C")?;
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    shutdown.cancel();
    engine.stop().await;

    let stats = engine.stats();
    println!("Ticks:              {}", stats.ticks);
    println!("Evaluations:        {}", stats.evaluations);
    println!("Entries emitted:    {}", stats.entries_emitted);
    println!("Exits emitted:      {}", stats.exits_emitted);
    println!("Risk denials:       {}", stats.risk_denials);
    println!("Failures:           {}", stats.evaluation_failures);
    println!("Paper intents:      {}", execution.submitted());

    Ok(())
}
