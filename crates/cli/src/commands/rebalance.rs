use crate::commands::read_json;
use crate::paper;
use anyhow::Result;
use clap::Args;
use defi_agent_core::config::{AgentConfig, MarketConfig, RebalanceConfig};
use defi_agent_core::portfolio::RebalanceAction;
use defi_agent_core::ReportFormatter;
use defi_agent_orchestrator::StrategyEngine;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Arguments for the rebalance command.
#[derive(Args, Debug, Clone)]
pub struct RebalanceArgs {
    /// JSON file with `current`, `target` (symbol → percent) and `total_value`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Tolerated deviation in percentage points
    #[arg(long, default_value = "2")]
    pub threshold: Decimal,

    /// Print the actions as JSON instead of a report
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct RebalanceInput {
    #[serde(default)]
    pub current: HashMap<String, Decimal>,
    pub target: HashMap<String, Decimal>,
    pub total_value: Decimal,
}

pub(crate) fn plan(input: &RebalanceInput, threshold: Decimal) -> Vec<RebalanceAction> {
    let config = AgentConfig {
        rebalance: RebalanceConfig {
            threshold_pct: threshold,
        },
        ..AgentConfig::default()
    };
    let (collaborators, _) = paper::collaborators(&MarketConfig::default());
    let engine = StrategyEngine::new(&config, collaborators);
    engine.plan_rebalance(&input.current, &input.target, input.total_value)
}

/// Runs the rebalance command.
///
/// # Errors
/// Returns an error if the input file cannot be read or parsed.
pub fn run_rebalance(args: &RebalanceArgs) -> Result<()> {
    let input: RebalanceInput = read_json(&args.input)?;
    let actions = plan(&input, args.threshold);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
    } else {
        print!(
            "{}",
            ReportFormatter::format_rebalance(&actions, input.total_value)
        );
    }
    Ok(())
}
