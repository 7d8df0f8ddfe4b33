use defi_agent_core::portfolio::{RiskAssessment, RiskLevel};
use defi_agent_core::position::OpenPosition;
use std::collections::HashMap;
use tracing::info;

/// Share of the risk score contributed by concentration.
const CONCENTRATION_WEIGHT: f64 = 0.6;
/// Flat bump applied once when any open position is levered.
const LEVERAGE_PENALTY: f64 = 0.1;
/// Leverage above which a "reduce leverage" note is added.
const HIGH_LEVERAGE: f64 = 3.0;
/// Fewer held assets than this adds a "diversify" note.
const MIN_DIVERSIFIED_ASSETS: usize = 3;

/// Herfindahl-Hirschman index of an allocation given in percent.
///
/// Zero and negative entries are ignored; an empty allocation scores `0.0`.
///
/// # Examples
/// ```
/// use defi_agent_portfolio::herfindahl_index;
/// use std::collections::HashMap;
///
/// let allocation: HashMap<String, f64> =
///     [("BTC", 60.0), ("ETH", 40.0)].iter().map(|(k, v)| (k.to_string(), *v)).collect();
/// assert!((herfindahl_index(&allocation) - 0.52).abs() < 1e-12);
/// ```
#[must_use]
pub fn herfindahl_index(allocation: &HashMap<String, f64>) -> f64 {
    held(allocation).map(|pct| (pct / 100.0).powi(2)).sum()
}

fn held(allocation: &HashMap<String, f64>) -> impl Iterator<Item = f64> + '_ {
    allocation
        .values()
        .copied()
        .filter(|pct| pct.is_finite() && *pct > 0.0)
}

/// Scores portfolio concentration and leverage into a categorical risk level.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioRiskAssessor;

impl PortfolioRiskAssessor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Assesses an allocation (symbol → percent of portfolio) and the open positions.
    ///
    /// A portfolio holding a single asset is always `Critical`, whatever the score.
    /// Any second non-zero holding, however small, falls back to the score.
    #[must_use]
    pub fn assess(
        &self,
        allocation: &HashMap<String, f64>,
        positions: &[OpenPosition],
    ) -> RiskAssessment {
        let concentration = herfindahl_index(allocation);
        let asset_count = held(allocation).count();

        let leveraged = positions.iter().any(OpenPosition::is_leveraged);
        let max_leverage = positions
            .iter()
            .map(|p| p.leverage)
            .filter(|l| l.is_finite())
            .fold(1.0_f64, f64::max);

        let mut risk_score = concentration * CONCENTRATION_WEIGHT;
        if leveraged {
            risk_score += LEVERAGE_PENALTY;
        }

        let risk_level = if asset_count == 1 {
            RiskLevel::Critical
        } else {
            RiskLevel::from_score(risk_score)
        };

        let mut recommendations = level_recommendations(risk_level);
        if asset_count < MIN_DIVERSIFIED_ASSETS {
            recommendations.push(format!(
                "Diversify holdings across at least {MIN_DIVERSIFIED_ASSETS} assets"
            ));
        }
        if max_leverage > HIGH_LEVERAGE {
            recommendations.push(format!(
                "Reduce leverage: a position is at {max_leverage:.1}x, above {HIGH_LEVERAGE:.0}x"
            ));
        }

        info!(
            concentration,
            risk_score,
            level = %risk_level,
            assets = asset_count,
            max_leverage,
            "Portfolio risk assessed"
        );

        RiskAssessment {
            concentration,
            risk_score,
            risk_level,
            asset_count,
            max_leverage,
            recommendations,
        }
    }
}

fn level_recommendations(level: RiskLevel) -> Vec<String> {
    let lines: &[&str] = match level {
        RiskLevel::Low => &["Portfolio risk is within acceptable limits"],
        RiskLevel::Medium => &[
            "Monitor the largest positions closely",
            "Review allocation targets for drift",
        ],
        RiskLevel::High => &[
            "Reduce exposure to the largest positions",
            "Tighten stop-loss levels on open positions",
        ],
        RiskLevel::Critical => &[
            "Immediately reduce concentrated positions",
            "Pause new entries until risk is back within limits",
        ],
    };
    lines.iter().map(|s| (*s).to_string()).collect()
}
