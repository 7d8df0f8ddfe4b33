use crate::position::PortfolioRiskSnapshot;
use crate::position_sizing::SizingConfig;
use crate::strategy::Strategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub scheduler: SchedulerConfig,
    pub sizing: SizingConfig,
    pub rebalance: RebalanceConfig,
    pub market: MarketConfig,
    pub strategies: Vec<Strategy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
    /// Entry/exit score at or above which the scheduler acts.
    pub act_threshold: f64,
    /// Exit score below which an entry is still allowed.
    pub hold_threshold: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            act_threshold: 0.8,
            hold_threshold: 0.5,
        }
    }
}

impl SchedulerConfig {
    /// Tick interval, never shorter than one second.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Deviation, in percentage points, tolerated before an asset is traded.
    pub threshold_pct: Decimal,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            threshold_pct: Decimal::TWO,
        }
    }
}

/// Static market readings for paper runs without live feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub metrics: HashMap<String, f64>,
    pub portfolio_value: Decimal,
    pub risk: PortfolioRiskSnapshot,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            metrics: HashMap::new(),
            portfolio_value: Decimal::from(10000),
            risk: PortfolioRiskSnapshot::default(),
        }
    }
}
