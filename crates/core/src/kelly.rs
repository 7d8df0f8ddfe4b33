//! Kelly Criterion sizing for trades with a known win/loss ratio.
//!
//! Provides the capped Kelly fraction used by the `Kelly` position sizing model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kelly Criterion sizer for trades with win probability `p` and win/loss ratio `b`.
///
/// The Kelly fraction is:
/// ```text
/// f* = (b*p - (1-p)) / b
/// ```
///
/// A negative `f*` means the trade has negative edge and is sized at zero.
/// A positive `f*` is capped at `max_fraction` of the bankroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellySizer {
    /// Maximum fraction of the bankroll committed to one trade
    pub max_fraction: Decimal,
}

/// Result of Kelly sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyDecision {
    /// Fraction of bankroll actually committed (after clamping)
    pub fraction: Decimal,
    /// Raw Kelly fraction before clamping
    pub full_kelly_fraction: Decimal,
    /// Recommended stake amount
    pub stake: Decimal,
    /// Reason for the decision
    pub reason: KellyReason,
}

/// Reason for a Kelly sizing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KellyReason {
    /// Positive edge, raw Kelly fraction used as-is
    PositiveEdge,
    /// Positive edge, raw Kelly fraction capped at `max_fraction`
    Capped,
    /// Zero or negative edge, nothing staked
    NoEdge,
    /// Probability outside [0, 1], non-positive ratio, or non-positive bankroll
    InvalidInputs,
}

impl KellySizer {
    /// Creates a sizer capped at `max_fraction`. A negative cap is treated as zero.
    #[must_use]
    pub fn new(max_fraction: Decimal) -> Self {
        Self {
            max_fraction: max_fraction.max(Decimal::ZERO),
        }
    }

    /// Raw Kelly fraction `(b*p - (1-p)) / b`, or `None` when `b <= 0` or the
    /// arithmetic overflows.
    #[must_use]
    pub fn full_kelly(win_prob: Decimal, win_loss_ratio: Decimal) -> Option<Decimal> {
        if win_loss_ratio <= Decimal::ZERO {
            return None;
        }
        let lose_prob = Decimal::ONE.checked_sub(win_prob)?;
        win_loss_ratio
            .checked_mul(win_prob)?
            .checked_sub(lose_prob)?
            .checked_div(win_loss_ratio)
    }

    /// Sizes a trade against `bankroll`.
    ///
    /// # Examples
    /// ```
    /// use defi_agent_core::kelly::KellySizer;
    /// use rust_decimal_macros::dec;
    ///
    /// let sizer = KellySizer::new(dec!(0.1));
    /// let decision = sizer.size(dec!(0.6), dec!(2.0), dec!(100000));
    ///
    /// // Raw Kelly is 0.4, capped to 10% of the bankroll
    /// assert_eq!(decision.stake, dec!(10000));
    /// ```
    #[must_use]
    pub fn size(&self, win_prob: Decimal, win_loss_ratio: Decimal, bankroll: Decimal) -> KellyDecision {
        let full_kelly = match Self::full_kelly(win_prob, win_loss_ratio) {
            Some(f) if win_prob >= Decimal::ZERO
                && win_prob <= Decimal::ONE
                && bankroll > Decimal::ZERO =>
            {
                f
            }
            _ => {
                return KellyDecision {
                    fraction: Decimal::ZERO,
                    full_kelly_fraction: Decimal::ZERO,
                    stake: Decimal::ZERO,
                    reason: KellyReason::InvalidInputs,
                }
            }
        };

        if full_kelly <= Decimal::ZERO {
            return KellyDecision {
                fraction: Decimal::ZERO,
                full_kelly_fraction: full_kelly,
                stake: Decimal::ZERO,
                reason: KellyReason::NoEdge,
            };
        }

        let (fraction, reason) = if full_kelly > self.max_fraction {
            (self.max_fraction, KellyReason::Capped)
        } else {
            (full_kelly, KellyReason::PositiveEdge)
        };

        KellyDecision {
            fraction,
            full_kelly_fraction: full_kelly,
            stake: fraction.saturating_mul(bankroll),
            reason,
        }
    }
}
