use crate::kelly::KellySizer;
use crate::strategy::{PositionSizingModel, Strategy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tunables for the position sizer. Defaults match the documented constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Volatility assumed when the live reading is zero or unusable.
    pub default_volatility: f64,
    /// Lower clamp for the volatility-target fraction.
    pub volatility_min_fraction: Decimal,
    /// Upper clamp for the volatility-target fraction.
    pub volatility_max_fraction: Decimal,
    /// Fraction used when a model payload is unusable.
    pub fallback_fraction: Decimal,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            default_volatility: 0.02,
            volatility_min_fraction: dec!(0.005),
            volatility_max_fraction: dec!(0.1),
            fallback_fraction: dec!(0.02),
        }
    }
}

/// Converts a strategy's sizing model and the portfolio value into capital for one trade.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    config: SizingConfig,
}

impl PositionSizer {
    #[must_use]
    pub const fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Capital to allocate for one trade of `strategy`.
    ///
    /// # Arguments
    /// * `strategy` - Strategy whose sizing model is applied
    /// * `portfolio_value` - Current total portfolio value
    /// * `current_volatility` - Live volatility reading, only used by `VolatilityTarget`
    ///
    /// # Returns
    /// Amount of capital, never negative for a non-negative portfolio value
    #[must_use]
    pub fn size(
        &self,
        strategy: &Strategy,
        portfolio_value: Decimal,
        current_volatility: f64,
    ) -> Decimal {
        self.fraction(&strategy.sizing, current_volatility)
            .saturating_mul(portfolio_value)
    }

    /// Fraction of the portfolio the model commits.
    #[must_use]
    pub fn fraction(&self, model: &PositionSizingModel, current_volatility: f64) -> Decimal {
        match model {
            PositionSizingModel::Kelly {
                win_probability,
                win_loss_ratio,
                max_fraction,
            } => {
                if *win_loss_ratio <= Decimal::ZERO {
                    tracing::warn!(
                        "Kelly sizing with non-positive win/loss ratio {}, using fallback fraction",
                        win_loss_ratio
                    );
                    return self.config.fallback_fraction;
                }
                KellySizer::new(*max_fraction)
                    .size(*win_probability, *win_loss_ratio, Decimal::ONE)
                    .fraction
            }
            PositionSizingModel::VolatilityTarget {
                target_volatility, ..
            } => self.volatility_target_fraction(*target_volatility, current_volatility),
            PositionSizingModel::FixedFraction { fraction } => *fraction,
        }
    }

    fn volatility_target_fraction(&self, target: f64, current: f64) -> Decimal {
        let current = if current == 0.0 || !current.is_finite() {
            self.config.default_volatility
        } else {
            current
        };

        let min = self.config.volatility_min_fraction;
        let max = self.config.volatility_max_fraction;
        let raw = target / current;

        let fraction = Decimal::try_from(raw).unwrap_or(if raw > 0.0 { max } else { min });
        fraction.clamp(min, max)
    }
}

/// Calculate required margin for a position
///
/// # Arguments
/// * `position_value` - Total position value
/// * `leverage` - Leverage multiplier
///
/// # Returns
/// Required margin, equal to the position value when leverage is not above 1
#[must_use]
pub fn calculate_required_margin(position_value: Decimal, leverage: Decimal) -> Decimal {
    if leverage <= Decimal::ONE {
        return position_value;
    }
    position_value / leverage
}
