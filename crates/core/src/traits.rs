use crate::events::TradeIntent;
use crate::position::PortfolioRiskSnapshot;
use crate::strategy::Metadata;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Resolves the current value of a named indicator or market metric.
///
/// Unknown metrics resolve to `0.0`; an `Err` is reserved for provider failures
/// (network, stale feed) and is treated by callers as "condition not met".
#[async_trait]
pub trait MetricValueProvider: Send + Sync {
    async fn metric_value(&self, metric: &str, metadata: &Metadata) -> Result<f64>;
}

/// Reports the current total portfolio value.
#[async_trait]
pub trait PortfolioValueProvider: Send + Sync {
    async fn portfolio_value(&self) -> Result<Decimal>;
}

/// Reports live portfolio risk readings.
#[async_trait]
pub trait RiskSnapshotProvider: Send + Sync {
    async fn risk_snapshot(&self) -> Result<PortfolioRiskSnapshot>;
}

/// Accepts sized trade intents for execution.
///
/// `submit` returns once the intent is accepted; it does not wait for fills
/// or on-chain confirmation.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn submit(&self, intent: TradeIntent) -> Result<()>;
}
