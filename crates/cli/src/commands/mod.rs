//! CLI subcommands.

pub mod assess;
pub mod rebalance;
pub mod run;
pub mod size;
pub mod validate;

pub use assess::{run_assess, AssessArgs};
pub use rebalance::{run_rebalance, RebalanceArgs};
pub use run::{run_agent, RunArgs};
pub use size::{run_size, SizeArgs};
pub use validate::{run_validate, ValidateArgs};

use anyhow::{Context, Result};
use defi_agent_core::config::AgentConfig;
use defi_agent_core::ConfigLoader;
use serde::de::DeserializeOwned;
use std::path::Path;

pub(crate) fn load_config(path: &Path, profile: Option<&str>) -> Result<AgentConfig> {
    match profile {
        Some(profile) => ConfigLoader::load_with_profile(path, profile),
        None => ConfigLoader::load(path),
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
