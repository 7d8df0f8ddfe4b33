use defi_agent_core::portfolio::{RebalanceAction, RebalanceKind};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Plans buy/sell actions for assets that drifted from their target weight.
///
/// Only assets named in the target allocation are considered. An asset is
/// traded when its deviation is strictly greater than the threshold. Assets
/// whose amounts do not fit in a `Decimal` are logged and left out.
#[derive(Debug, Clone)]
pub struct RebalanceActionPlanner {
    /// Tolerated deviation in percentage points.
    threshold_pct: Decimal,
}

impl Default for RebalanceActionPlanner {
    fn default() -> Self {
        Self::new(Decimal::TWO)
    }
}

impl RebalanceActionPlanner {
    /// Negative thresholds are treated as zero.
    #[must_use]
    pub fn new(threshold_pct: Decimal) -> Self {
        Self {
            threshold_pct: threshold_pct.max(Decimal::ZERO),
        }
    }

    #[must_use]
    pub const fn threshold_pct(&self) -> Decimal {
        self.threshold_pct
    }

    /// Actions needed to move `current` towards `target`, ordered by asset symbol.
    ///
    /// # Arguments
    /// * `current` - Symbol → current percent of portfolio (missing means 0)
    /// * `target` - Symbol → target percent of portfolio
    /// * `total_value` - Portfolio value the percentages refer to
    #[must_use]
    pub fn plan(
        &self,
        current: &HashMap<String, Decimal>,
        target: &HashMap<String, Decimal>,
        total_value: Decimal,
    ) -> Vec<RebalanceAction> {
        let ordered: BTreeMap<&String, &Decimal> = target.iter().collect();
        let mut actions = Vec::new();

        for (asset, target_pct) in ordered {
            let current_pct = current.get(asset).copied().unwrap_or(Decimal::ZERO);
            let Some(deviation) = current_pct.checked_sub(*target_pct) else {
                warn!(asset = %asset, %current_pct, %target_pct, "Deviation out of range, skipping");
                continue;
            };

            if deviation.abs() <= self.threshold_pct {
                debug!(asset = %asset, %deviation, "Within rebalance tolerance");
                continue;
            }

            let Some(amount) = (deviation.abs() / HUNDRED).checked_mul(total_value) else {
                warn!(asset = %asset, %deviation, %total_value, "Trade amount out of range, skipping");
                continue;
            };

            let action = if deviation < Decimal::ZERO {
                RebalanceKind::Buy
            } else {
                RebalanceKind::Sell
            };

            actions.push(RebalanceAction {
                asset: asset.clone(),
                action,
                amount: amount.abs(),
                reason: format!(
                    "{asset} at {}% vs target {}% ({:+}pp)",
                    current_pct.normalize(),
                    target_pct.normalize(),
                    deviation.normalize()
                ),
            });
        }

        info!(
            actions = actions.len(),
            %total_value,
            threshold_pct = %self.threshold_pct,
            "Rebalance plan computed"
        );
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pct(entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn drifted_assets_only() {
        let current = pct(&[("BTC", dec!(50)), ("ETH", dec!(30)), ("CASH", dec!(20))]);
        let target = pct(&[("BTC", dec!(40)), ("ETH", dec!(30)), ("CASH", dec!(30))]);

        let actions = RebalanceActionPlanner::default().plan(&current, &target, dec!(100000));

        assert_eq!(actions.len(), 2);
        let btc = actions.iter().find(|a| a.asset == "BTC").unwrap();
        assert_eq!(btc.action, RebalanceKind::Sell);
        assert_eq!(btc.amount, dec!(10000));
        assert!(btc.reason.contains("50%") && btc.reason.contains("40%"));

        let cash = actions.iter().find(|a| a.asset == "CASH").unwrap();
        assert_eq!(cash.action, RebalanceKind::Buy);
        assert_eq!(cash.amount, dec!(10000));

        assert!(actions.iter().all(|a| a.asset != "ETH"));
    }

    #[test]
    fn threshold_is_inclusive() {
        let current = pct(&[("BTC", dec!(42)), ("ETH", dec!(57.9))]);
        let target = pct(&[("BTC", dec!(40)), ("ETH", dec!(60))]);

        let actions = RebalanceActionPlanner::default().plan(&current, &target, dec!(1000));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].asset, "ETH");
        assert_eq!(actions[0].action, RebalanceKind::Buy);
        assert_eq!(actions[0].amount, dec!(21));
    }

    #[test]
    fn missing_current_counts_as_zero() {
        let current = pct(&[("BTC", dec!(100))]);
        let target = pct(&[("BTC", dec!(70)), ("USDC", dec!(30))]);

        let actions = RebalanceActionPlanner::default().plan(&current, &target, dec!(50000));
        assert_eq!(actions.len(), 2);
        // Ordered by symbol
        assert_eq!(actions[0].asset, "BTC");
        assert_eq!(actions[0].action, RebalanceKind::Sell);
        assert_eq!(actions[0].amount, dec!(15000));
        assert_eq!(actions[1].asset, "USDC");
        assert_eq!(actions[1].action, RebalanceKind::Buy);
        assert_eq!(actions[1].amount, dec!(15000));
    }

    #[test]
    fn assets_without_target_ignored() {
        let current = pct(&[("BTC", dec!(50)), ("DOGE", dec!(50))]);
        let target = pct(&[("BTC", dec!(50))]);

        let actions = RebalanceActionPlanner::default().plan(&current, &target, dec!(10000));
        assert!(actions.is_empty());
    }

    #[test]
    fn custom_threshold() {
        let current = pct(&[("BTC", dec!(45))]);
        let target = pct(&[("BTC", dec!(40))]);

        let loose = RebalanceActionPlanner::new(dec!(5));
        assert!(loose.plan(&current, &target, dec!(10000)).is_empty());

        let tight = RebalanceActionPlanner::new(dec!(1));
        let actions = tight.plan(&current, &target, dec!(10000));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].amount, dec!(500));

        assert_eq!(RebalanceActionPlanner::new(dec!(-3)).threshold_pct(), Decimal::ZERO);
    }

    #[test]
    fn amounts_are_positive() {
        let current = pct(&[("A", dec!(10)), ("B", dec!(90))]);
        let target = pct(&[("A", dec!(90)), ("B", dec!(10))]);
        let actions = RebalanceActionPlanner::default().plan(&current, &target, dec!(1234.56));
        assert!(actions.iter().all(|a| a.amount > Decimal::ZERO));
    }

    #[test]
    fn out_of_range_amounts_are_skipped() {
        let current = pct(&[("BTC", Decimal::MAX), ("ETH", dec!(20)), ("SOL", Decimal::MIN)]);
        let target = pct(&[("BTC", dec!(0)), ("ETH", dec!(30)), ("SOL", Decimal::MAX)]);

        let actions = RebalanceActionPlanner::default().plan(&current, &target, Decimal::MAX);
        // BTC overflows the amount and SOL the deviation; ETH is still planned.
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].asset, "ETH");
        assert_eq!(actions[0].action, RebalanceKind::Buy);
    }
}
