use crate::commands::read_json;
use crate::paper;
use anyhow::Result;
use clap::Args;
use defi_agent_core::config::{AgentConfig, MarketConfig};
use defi_agent_core::portfolio::RiskAssessment;
use defi_agent_core::position::OpenPosition;
use defi_agent_core::ReportFormatter;
use defi_agent_orchestrator::StrategyEngine;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Arguments for the assess command.
#[derive(Args, Debug, Clone)]
pub struct AssessArgs {
    /// JSON file with `allocation` (symbol → percent) and optional `positions`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Print the assessment as JSON instead of a report
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssessInput {
    pub allocation: HashMap<String, f64>,
    #[serde(default)]
    pub positions: Vec<OpenPosition>,
}

pub(crate) fn assess(input: &AssessInput) -> RiskAssessment {
    let (collaborators, _) = paper::collaborators(&MarketConfig::default());
    let engine = StrategyEngine::new(&AgentConfig::default(), collaborators);
    engine.assess_portfolio_risk(&input.allocation, &input.positions)
}

/// Runs the assess command.
///
/// # Errors
/// Returns an error if the input file cannot be read or parsed.
pub fn run_assess(args: &AssessArgs) -> Result<()> {
    let input: AssessInput = read_json(&args.input)?;
    let assessment = assess(&input);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", ReportFormatter::format_assessment(&assessment));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_agent_core::portfolio::RiskLevel;

    #[test]
    fn parses_input_and_assesses() {
        let input: AssessInput = serde_json::from_str(
            r#"{
                "allocation": {"BTC": 40, "ETH": 35, "USDC": 25},
                "positions": [{"symbol": "ETH", "value": "3500", "leverage": 4.0}]
            }"#,
        )
        .unwrap();

        let assessment = assess(&input);
        assert_eq!(assessment.asset_count, 3);
        // HHI 0.345 * 0.6 + 0.1 = 0.307
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert!(assessment
            .recommendations
            .iter()
            .any(|r| r.starts_with("Reduce leverage")));
    }
}
