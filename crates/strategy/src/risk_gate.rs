use defi_agent_core::position::PortfolioRiskSnapshot;
use defi_agent_core::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which configured limit a live reading breached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "breach", rename_all = "snake_case")]
pub enum RiskBreach {
    Volatility { live: f64, limit: f64 },
    MaxDrawdown { live: f64, limit: f64 },
    ValueAtRisk { live: f64, limit: f64 },
}

impl fmt::Display for RiskBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Volatility { live, limit } => {
                write!(f, "volatility {live:.4} exceeds limit {limit:.4}")
            }
            Self::MaxDrawdown { live, limit } => {
                write!(f, "drawdown {live:.4} exceeds limit {limit:.4}")
            }
            Self::ValueAtRisk { live, limit } => {
                write!(f, "value-at-risk {live:.4} exceeds limit {limit:.4}")
            }
        }
    }
}

/// Binary veto on new exposure when live portfolio risk exceeds a strategy's limits.
///
/// Checks run in a fixed order (volatility, drawdown, value-at-risk) and stop at
/// the first breach. A reading that cannot be compared (NaN) counts as a breach.
/// The gate holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskGate;

impl RiskGate {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// `true` only if every live reading is within the strategy's limits.
    #[must_use]
    pub fn allow(&self, strategy: &Strategy, live: &PortfolioRiskSnapshot) -> bool {
        match self.check(strategy, live) {
            Ok(()) => true,
            Err(breach) => {
                tracing::info!(
                    strategy_id = %strategy.id,
                    "Risk gate denied trade: {}",
                    breach
                );
                false
            }
        }
    }

    /// Returns the first breached limit, if any.
    ///
    /// # Errors
    /// Returns the [`RiskBreach`] describing the first limit exceeded.
    pub fn check(&self, strategy: &Strategy, live: &PortfolioRiskSnapshot) -> Result<(), RiskBreach> {
        let limits = &strategy.risk;

        if !within(live.volatility, limits.volatility_limit) {
            return Err(RiskBreach::Volatility {
                live: live.volatility,
                limit: limits.volatility_limit,
            });
        }
        if !within(live.max_drawdown, limits.max_drawdown) {
            return Err(RiskBreach::MaxDrawdown {
                live: live.max_drawdown,
                limit: limits.max_drawdown,
            });
        }
        if !within(live.value_at_risk, limits.value_at_risk) {
            return Err(RiskBreach::ValueAtRisk {
                live: live.value_at_risk,
                limit: limits.value_at_risk,
            });
        }
        Ok(())
    }
}

fn within(live: f64, limit: f64) -> bool {
    live <= limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_agent_core::strategy::RiskParameters;

    fn strategy() -> Strategy {
        Strategy::new("s1", "Gate test", "momentum").with_risk(RiskParameters {
            max_drawdown: 0.2,
            value_at_risk: 0.05,
            volatility_limit: 0.4,
            ..RiskParameters::default()
        })
    }

    #[test]
    fn allows_when_all_within_limits() {
        let gate = RiskGate::new();
        let live = PortfolioRiskSnapshot::new(0.3, 0.1, 0.02);
        assert!(gate.allow(&strategy(), &live));
        assert!(gate.check(&strategy(), &live).is_ok());
    }

    #[test]
    fn limits_are_inclusive() {
        let gate = RiskGate::new();
        let live = PortfolioRiskSnapshot::new(0.4, 0.2, 0.05);
        assert!(gate.allow(&strategy(), &live));
    }

    #[test]
    fn each_breach_denies() {
        let gate = RiskGate::new();
        let s = strategy();

        let live = PortfolioRiskSnapshot::new(0.41, 0.1, 0.02);
        assert!(!gate.allow(&s, &live));
        assert!(matches!(gate.check(&s, &live), Err(RiskBreach::Volatility { .. })));

        let live = PortfolioRiskSnapshot::new(0.3, 0.25, 0.02);
        assert!(!gate.allow(&s, &live));
        assert!(matches!(gate.check(&s, &live), Err(RiskBreach::MaxDrawdown { .. })));

        let live = PortfolioRiskSnapshot::new(0.3, 0.1, 0.06);
        assert!(!gate.allow(&s, &live));
        assert!(matches!(gate.check(&s, &live), Err(RiskBreach::ValueAtRisk { .. })));
    }

    #[test]
    fn first_breach_reported() {
        let gate = RiskGate::new();
        let live = PortfolioRiskSnapshot::new(0.9, 0.9, 0.9);
        assert_eq!(
            gate.check(&strategy(), &live),
            Err(RiskBreach::Volatility {
                live: 0.9,
                limit: 0.4
            })
        );
    }

    #[test]
    fn allow_matches_all_three_checks_over_grid() {
        let gate = RiskGate::new();
        let s = strategy();
        let values = [0.0, 0.03, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5];
        for vol in values {
            for dd in values {
                for var in values {
                    let live = PortfolioRiskSnapshot::new(vol, dd, var);
                    let expected = vol <= 0.4 && dd <= 0.2 && var <= 0.05;
                    assert_eq!(gate.allow(&s, &live), expected, "{live:?}");
                }
            }
        }
    }

    #[test]
    fn nan_reading_fails_closed() {
        let gate = RiskGate::new();
        let live = PortfolioRiskSnapshot::new(f64::NAN, 0.0, 0.0);
        assert!(!gate.allow(&strategy(), &live));
    }

    #[test]
    fn breach_display_names_limit() {
        let breach = RiskBreach::MaxDrawdown {
            live: 0.25,
            limit: 0.2,
        };
        assert_eq!(breach.to_string(), "drawdown 0.2500 exceeds limit 0.2000");
    }

    #[test]
    fn breach_serializes_with_kind_tag() {
        let breach = RiskBreach::ValueAtRisk {
            live: 0.06,
            limit: 0.05,
        };
        let json = serde_json::to_value(breach).unwrap();
        assert_eq!(json["breach"], "value_at_risk");
        assert_eq!(json["live"], 0.06);
        assert_eq!(json["limit"], 0.05);

        let back: RiskBreach = serde_json::from_value(json).unwrap();
        assert_eq!(back, breach);
    }
}
