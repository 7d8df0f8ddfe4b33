use crate::commands::load_config;
use crate::paper;
use anyhow::{anyhow, Result};
use clap::Args;
use defi_agent_core::config::AgentConfig;
use defi_agent_core::position_sizing::calculate_required_margin;
use defi_agent_orchestrator::StrategyEngine;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Arguments for the size command.
#[derive(Args, Debug, Clone)]
pub struct SizeArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/agent.toml")]
    pub config: PathBuf,

    /// Profile overlay (`<config>.<profile>.toml`)
    #[arg(long)]
    pub profile: Option<String>,

    /// Id of a configured strategy
    #[arg(short, long)]
    pub strategy: String,

    /// Portfolio value (defaults to `market.portfolio_value`)
    #[arg(long)]
    pub portfolio_value: Option<Decimal>,

    /// Current volatility (defaults to `market.risk.volatility`)
    #[arg(long)]
    pub volatility: Option<f64>,
}

/// Dry-run sizing result for one strategy.
#[derive(Debug)]
pub(crate) struct SizeReport {
    pub model: &'static str,
    pub portfolio_value: Decimal,
    pub amount: Decimal,
    /// Margin needed for `amount` at the strategy's maximum leverage.
    pub required_margin: Decimal,
}

pub(crate) fn size_for(
    config: &AgentConfig,
    strategy_id: &str,
    portfolio_value: Option<Decimal>,
    volatility: Option<f64>,
) -> Result<SizeReport> {
    let strategy = config
        .strategies
        .iter()
        .find(|s| s.id == strategy_id)
        .ok_or_else(|| anyhow!("Strategy {strategy_id} is not configured"))?;

    let (collaborators, _) = paper::collaborators(&config.market);
    let engine = StrategyEngine::new(config, collaborators);

    let value = portfolio_value.unwrap_or(config.market.portfolio_value);
    let volatility = volatility.unwrap_or(config.market.risk.volatility);
    let amount = engine.calculate_position_size_at(strategy, value, volatility);
    let leverage = Decimal::try_from(strategy.risk.max_leverage).unwrap_or(Decimal::ONE);

    Ok(SizeReport {
        model: strategy.sizing.label(),
        portfolio_value: value,
        amount,
        required_margin: calculate_required_margin(amount, leverage),
    })
}

/// Runs the size command.
///
/// # Errors
/// Returns an error if configuration fails to load or the strategy is unknown.
pub fn run_size(args: &SizeArgs) -> Result<()> {
    let config = load_config(&args.config, args.profile.as_deref())?;
    let report = size_for(&config, &args.strategy, args.portfolio_value, args.volatility)?;

    let fraction = if report.portfolio_value.is_zero() {
        Decimal::ZERO
    } else {
        report.amount / report.portfolio_value * Decimal::ONE_HUNDRED
    };

    println!("Strategy:          {}", args.strategy);
    println!("Sizing model:      {}", report.model);
    println!("Portfolio value:   ${:.2}", report.portfolio_value);
    println!("Position size:     ${:.2} ({fraction:.2}%)", report.amount);
    println!("Required margin:   ${:.2}", report.required_margin);
    Ok(())
}
