use crate::config::AgentConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads agent configuration by merging defaults, a TOML file, a sibling JSON
    /// file with the same stem, and `AGENT_`-prefixed environment variables.
    ///
    /// Nested keys use a double underscore: `AGENT_SCHEDULER__INTERVAL_SECS=60`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<AgentConfig> {
        let path = path.as_ref();
        let config: AgentConfig = Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        tracing::debug!(
            "Loaded configuration from {} with {} strategies",
            path.display(),
            config.strategies.len()
        );
        Ok(config)
    }

    /// Loads configuration with a profile overlay (`Config.<profile>.toml` next to `path`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AgentConfig> {
        let path = path.as_ref();
        let profile_path = path.with_extension(format!("{profile}.toml"));
        let config: AgentConfig = Figment::from(Serialized::defaults(AgentConfig::default()))
            .merge(Toml::file(path))
            .merge(Toml::file(&profile_path))
            .merge(Json::file(path.with_extension("json")))
            .merge(Env::prefixed("AGENT_").split("__"))
            .extract()
            .with_context(|| {
                format!(
                    "Failed to load configuration from {} (profile {profile})",
                    path.display()
                )
            })?;

        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AgentConfig::default()))
            .merge(Toml::file(path))
            .merge(Json::file(path.with_extension("json")))
            .merge(Env::prefixed("AGENT_").split("__"))
    }
}
