pub mod config;
pub mod config_loader;
pub mod error;
pub mod events;
pub mod kelly;
pub mod portfolio;
pub mod position;
pub mod position_sizing;
pub mod report_formatter;
pub mod strategy;
pub mod traits;
pub mod validation;

pub use config::{AgentConfig, MarketConfig, RebalanceConfig, SchedulerConfig};
pub use config_loader::ConfigLoader;
pub use error::AgentError;
pub use events::{IntentKind, TradeIntent};
pub use kelly::{KellyDecision, KellyReason, KellySizer};
pub use portfolio::{RebalanceAction, RebalanceKind, RiskAssessment, RiskLevel};
pub use position::{OpenPosition, PortfolioRiskSnapshot};
pub use position_sizing::{PositionSizer, SizingConfig};
pub use report_formatter::ReportFormatter;
pub use strategy::{
    ComparisonOperator, Condition, Metadata, PerformanceCounters, PositionSizingModel,
    RiskParameters, Strategy,
};
pub use traits::{ExecutionBackend, MetricValueProvider, PortfolioValueProvider, RiskSnapshotProvider};
pub use validation::validate_strategy;
