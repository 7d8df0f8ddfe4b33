use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open position as reported by the portfolio collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub symbol: String,
    /// Notional value of the position.
    #[serde(default)]
    pub value: Decimal,
    /// Leverage multiplier; 1.0 means unlevered.
    #[serde(default = "default_leverage")]
    pub leverage: f64,
}

const fn default_leverage() -> f64 {
    1.0
}

impl OpenPosition {
    #[must_use]
    pub fn new(symbol: impl Into<String>, value: Decimal, leverage: f64) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            leverage,
        }
    }

    #[must_use]
    pub fn is_leveraged(&self) -> bool {
        self.leverage > 1.0
    }
}

/// Live portfolio-level risk readings used by the risk gate.
///
/// Fetched fresh for every evaluation and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRiskSnapshot {
    /// Current market volatility (0.3 = 30%).
    pub volatility: f64,
    /// Current portfolio drawdown from peak.
    pub max_drawdown: f64,
    /// Current value-at-risk as a fraction of the portfolio.
    pub value_at_risk: f64,
}

impl PortfolioRiskSnapshot {
    #[must_use]
    pub const fn new(volatility: f64, max_drawdown: f64, value_at_risk: f64) -> Self {
        Self {
            volatility,
            max_drawdown,
            value_at_risk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn position_leverage_defaults_to_one() {
        let pos: OpenPosition =
            serde_json::from_str(r#"{"symbol": "ETH", "value": "2500"}"#).unwrap();
        assert_eq!(pos.value, dec!(2500));
        assert!(!pos.is_leveraged());
    }

    #[test]
    fn leverage_above_one_is_leveraged() {
        assert!(OpenPosition::new("BTC", dec!(1000), 1.5).is_leveraged());
        assert!(!OpenPosition::new("BTC", dec!(1000), 1.0).is_leveraged());
    }
}
