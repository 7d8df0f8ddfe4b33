use crate::commands::load_config;
use anyhow::{bail, Result};
use clap::Args;
use defi_agent_core::config::AgentConfig;
use defi_agent_core::validation::collect_problems;
use std::collections::HashSet;
use std::path::PathBuf;

/// Arguments for the validate command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/agent.toml")]
    pub config: PathBuf,

    /// Profile overlay (`<config>.<profile>.toml`)
    #[arg(long)]
    pub profile: Option<String>,
}

/// Every problem across the configured strategies, including repeated ids.
pub(crate) fn problems(config: &AgentConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut problems = Vec::new();

    for strategy in &config.strategies {
        if !seen.insert(strategy.id.as_str()) {
            problems.push(format!("strategy {}: duplicate id", strategy.id));
        }
        problems.extend(collect_problems(strategy));
    }
    problems
}

/// Runs the validate command.
///
/// # Errors
/// Returns an error if configuration fails to load or any strategy is invalid.
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let config = load_config(&args.config, args.profile.as_deref())?;
    let problems = problems(&config);

    if problems.is_empty() {
        println!(
            "✅ {} strategies valid ({})",
            config.strategies.len(),
            args.config.display()
        );
        return Ok(());
    }

    for problem in &problems {
        println!("❌ {problem}");
    }
    bail!("{} problem(s) found in {}", problems.len(), args.config.display())
}
