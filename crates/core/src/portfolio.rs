//! Portfolio-level assessment and rebalance types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical portfolio risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Buckets a risk score: `<0.3` low, `<0.6` medium, `<0.8` high, otherwise critical.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            Self::Low
        } else if score < 0.6 {
            Self::Medium
        } else if score < 0.8 {
            Self::High
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Result of a portfolio risk assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Herfindahl-Hirschman index of the allocation, in `[1/n, 1]`.
    pub concentration: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// Number of assets with a non-zero allocation.
    pub asset_count: usize,
    /// Highest leverage among open positions (1.0 with none open).
    pub max_leverage: f64,
    pub recommendations: Vec<String>,
}

/// Direction of a rebalance trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceKind {
    Buy,
    Sell,
}

impl fmt::Display for RebalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("buy"),
            Self::Sell => f.write_str("sell"),
        }
    }
}

/// One trade needed to move an asset back to its target weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceAction {
    pub asset: String,
    pub action: RebalanceKind,
    /// Value to trade, always positive.
    pub amount: Decimal,
    pub reason: String,
}
