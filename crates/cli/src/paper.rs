//! Config-backed collaborators for paper runs.
//!
//! Metric values, portfolio value and risk readings come straight from the
//! `[market]` section of the configuration; intents are logged and counted
//! instead of executed.

use anyhow::Result;
use async_trait::async_trait;
use defi_agent_core::config::MarketConfig;
use defi_agent_core::events::TradeIntent;
use defi_agent_core::position::PortfolioRiskSnapshot;
use defi_agent_core::strategy::Metadata;
use defi_agent_core::traits::{
    ExecutionBackend, MetricValueProvider, PortfolioValueProvider, RiskSnapshotProvider,
};
use defi_agent_orchestrator::Collaborators;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct ConfigMetrics {
    values: HashMap<String, f64>,
}

#[async_trait]
impl MetricValueProvider for ConfigMetrics {
    async fn metric_value(&self, metric: &str, _metadata: &Metadata) -> Result<f64> {
        Ok(self.values.get(metric).copied().unwrap_or(0.0))
    }
}

pub struct ConfigPortfolio {
    value: Decimal,
}

#[async_trait]
impl PortfolioValueProvider for ConfigPortfolio {
    async fn portfolio_value(&self) -> Result<Decimal> {
        Ok(self.value)
    }
}

pub struct ConfigRisk {
    snapshot: PortfolioRiskSnapshot,
}

#[async_trait]
impl RiskSnapshotProvider for ConfigRisk {
    async fn risk_snapshot(&self) -> Result<PortfolioRiskSnapshot> {
        Ok(self.snapshot)
    }
}

/// Accepts every intent, logging it instead of trading.
#[derive(Default)]
pub struct PaperExecution {
    submitted: AtomicU64,
}

impl PaperExecution {
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ExecutionBackend for PaperExecution {
    async fn submit(&self, intent: TradeIntent) -> Result<()> {
        tracing::info!(
            intent_id = %intent.id,
            strategy_id = %intent.strategy_id,
            kind = ?intent.kind,
            amount = ?intent.amount,
            "[PAPER] Intent accepted"
        );
        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Builds collaborators from the market section, returning the paper backend for inspection.
pub fn collaborators(market: &MarketConfig) -> (Collaborators, Arc<PaperExecution>) {
    let execution = Arc::new(PaperExecution::default());
    let collaborators = Collaborators {
        metrics: Arc::new(ConfigMetrics {
            values: market.metrics.clone(),
        }),
        portfolio: Arc::new(ConfigPortfolio {
            value: market.portfolio_value,
        }),
        risk: Arc::new(ConfigRisk {
            snapshot: market.risk,
        }),
        execution: execution.clone(),
    };
    (collaborators, execution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_agent_core::events::IntentKind;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn providers_read_market_section() {
        let market = MarketConfig {
            metrics: [("rsi".to_string(), 28.5)].into_iter().collect(),
            portfolio_value: dec!(25000),
            risk: PortfolioRiskSnapshot::new(0.3, 0.1, 0.02),
        };
        let (collaborators, execution) = collaborators(&market);

        let metadata = Metadata::new();
        let rsi = collaborators.metrics.metric_value("rsi", &metadata).await.unwrap();
        assert!((rsi - 28.5).abs() < f64::EPSILON);
        let unknown = collaborators.metrics.metric_value("macd", &metadata).await.unwrap();
        assert!(unknown.abs() < f64::EPSILON);
        assert_eq!(collaborators.portfolio.portfolio_value().await.unwrap(), dec!(25000));
        assert_eq!(collaborators.risk.risk_snapshot().await.unwrap(), market.risk);

        let now = chrono::Utc::now();
        collaborators
            .execution
            .submit(TradeIntent {
                id: "s-enter-1".to_string(),
                strategy_id: "s".to_string(),
                strategy_name: "S".to_string(),
                kind: IntentKind::Enter,
                amount: Some(dec!(500)),
                entry_score: 1.0,
                exit_score: 0.0,
                stop_loss_pct: 0.05,
                take_profit_pct: 0.1,
                max_leverage: 1.0,
                created_at: now,
            })
            .await
            .unwrap();
        assert_eq!(execution.submitted(), 1);
    }
}
