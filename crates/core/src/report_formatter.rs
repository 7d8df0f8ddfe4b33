#![allow(clippy::format_push_string)]

use crate::portfolio::{RebalanceAction, RiskAssessment};
use rust_decimal::Decimal;

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format_assessment(assessment: &RiskAssessment) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("                 PORTFOLIO RISK ASSESSMENT                     \n");
        output.push_str(RULE);
        output.push('\n');

        output.push_str("Exposure\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Assets Held:           {}\n", assessment.asset_count));
        output.push_str(&format!(
            "Concentration (HHI):   {:.4}\n",
            assessment.concentration
        ));
        output.push_str(&format!(
            "Max Leverage:          {:.2}x\n",
            assessment.max_leverage
        ));
        output.push('\n');

        output.push_str("Risk\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Risk Score:            {:.4}\n", assessment.risk_score));
        output.push_str(&format!("Risk Level:            {}\n", assessment.risk_level));
        output.push('\n');

        output.push_str("Recommendations\n");
        output.push_str(THIN_RULE);
        for recommendation in &assessment.recommendations {
            output.push_str(&format!("- {recommendation}\n"));
        }
        output.push('\n');
        output.push_str(RULE);

        output
    }

    #[must_use]
    pub fn format_rebalance(actions: &[RebalanceAction], total_value: Decimal) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("                      REBALANCE PLAN                           \n");
        output.push_str(RULE);
        output.push_str(&format!("Portfolio Value:       ${total_value:.2}\n"));
        output.push('\n');

        if actions.is_empty() {
            output.push_str("All assets within tolerance, nothing to trade.\n");
        } else {
            output.push_str(&format!("{:<10} {:<6} {:>16}  {}\n", "Asset", "Side", "Amount", "Reason"));
            output.push_str(THIN_RULE);
            for action in actions {
                output.push_str(&format!(
                    "{:<10} {:<6} {:>16.2}  {}\n",
                    action.asset,
                    action.action.to_string(),
                    action.amount,
                    action.reason
                ));
            }
        }

        output.push('\n');
        output.push_str(RULE);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{RebalanceKind, RiskLevel};
    use rust_decimal_macros::dec;

    #[test]
    fn assessment_report_lists_level_and_recommendations() {
        let assessment = RiskAssessment {
            concentration: 0.25,
            risk_score: 0.15,
            risk_level: RiskLevel::Low,
            asset_count: 4,
            max_leverage: 1.0,
            recommendations: vec!["Portfolio risk is within acceptable limits".to_string()],
        };
        let report = ReportFormatter::format_assessment(&assessment);
        assert!(report.contains("Risk Level:            LOW"));
        assert!(report.contains("Concentration (HHI):   0.2500"));
        assert!(report.contains("- Portfolio risk is within acceptable limits"));
    }

    #[test]
    fn rebalance_report_rows() {
        let actions = vec![RebalanceAction {
            asset: "BTC".to_string(),
            action: RebalanceKind::Sell,
            amount: dec!(10000),
            reason: "BTC at 50% vs target 40%".to_string(),
        }];
        let report = ReportFormatter::format_rebalance(&actions, dec!(100000));
        assert!(report.contains("BTC"));
        assert!(report.contains("sell"));
        assert!(report.contains("10000.00"));

        let empty = ReportFormatter::format_rebalance(&[], dec!(100000));
        assert!(empty.contains("nothing to trade"));
    }
}
