use crate::registry::StrategyRegistry;
use crate::scheduler::{Collaborators, EvaluationScheduler, StrategyEvaluation};
use crate::stats::SchedulerStatsSnapshot;
use defi_agent_core::config::AgentConfig;
use defi_agent_core::error::AgentError;
use defi_agent_core::portfolio::{RebalanceAction, RiskAssessment};
use defi_agent_core::position::OpenPosition;
use defi_agent_core::position_sizing::PositionSizer;
use defi_agent_core::strategy::Strategy;
use defi_agent_portfolio::{PortfolioRiskAssessor, RebalanceActionPlanner};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Entry point for callers: strategy management, the evaluation loop and
/// on-demand portfolio checks behind one handle.
pub struct StrategyEngine {
    registry: StrategyRegistry,
    scheduler: EvaluationScheduler,
    sizer: PositionSizer,
    assessor: PortfolioRiskAssessor,
    planner: RebalanceActionPlanner,
}

impl StrategyEngine {
    /// Builds an engine from configuration. Configured strategies are not
    /// registered; see [`Self::register_configured`].
    #[must_use]
    pub fn new(config: &AgentConfig, collaborators: Collaborators) -> Self {
        let registry = StrategyRegistry::new();
        let scheduler = EvaluationScheduler::new(
            registry.clone(),
            collaborators,
            config.scheduler.clone(),
            config.sizing.clone(),
        );
        Self {
            registry,
            scheduler,
            sizer: PositionSizer::new(config.sizing.clone()),
            assessor: PortfolioRiskAssessor::new(),
            planner: RebalanceActionPlanner::new(config.rebalance.threshold_pct),
        }
    }

    /// Registers every strategy listed in the configuration.
    ///
    /// # Errors
    /// Stops at and returns the first strategy that fails to register.
    pub async fn register_configured(&self, config: &AgentConfig) -> Result<usize, AgentError> {
        for strategy in &config.strategies {
            self.registry.add(strategy.clone()).await?;
        }
        Ok(config.strategies.len())
    }

    /// # Errors
    /// See [`StrategyRegistry::add`].
    pub async fn add_strategy(&self, strategy: Strategy) -> Result<(), AgentError> {
        self.registry.add(strategy).await
    }

    /// # Errors
    /// Returns [`AgentError::NotFound`] if no strategy has this id.
    pub async fn remove_strategy(&self, id: &str) -> Result<(), AgentError> {
        self.registry.remove(id).await.map(|_| ())
    }

    /// # Errors
    /// Returns [`AgentError::AlreadyRunning`] if the scheduler is running.
    pub fn start(&self, parent: &CancellationToken) -> Result<(), AgentError> {
        self.scheduler.start(parent)
    }

    pub async fn stop(&self) {
        self.scheduler.stop().await;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub async fn evaluate_once(&self) -> Vec<StrategyEvaluation> {
        self.scheduler.evaluate_once().await
    }

    #[must_use]
    pub fn stats(&self) -> SchedulerStatsSnapshot {
        self.scheduler.stats()
    }

    #[must_use]
    pub fn assess_portfolio_risk(
        &self,
        allocation: &HashMap<String, f64>,
        positions: &[OpenPosition],
    ) -> RiskAssessment {
        self.assessor.assess(allocation, positions)
    }

    #[must_use]
    pub fn plan_rebalance(
        &self,
        current: &HashMap<String, Decimal>,
        target: &HashMap<String, Decimal>,
        total_value: Decimal,
    ) -> Vec<RebalanceAction> {
        self.planner.plan(current, target, total_value)
    }

    /// Dry-run size for `strategy`. Volatility-target models assume the configured
    /// default volatility.
    #[must_use]
    pub fn calculate_position_size(&self, strategy: &Strategy, portfolio_value: Decimal) -> Decimal {
        self.sizer.size(strategy, portfolio_value, 0.0)
    }

    /// Dry-run size using an explicit volatility reading.
    #[must_use]
    pub fn calculate_position_size_at(
        &self,
        strategy: &Strategy,
        portfolio_value: Decimal,
        current_volatility: f64,
    ) -> Decimal {
        self.sizer.size(strategy, portfolio_value, current_volatility)
    }

    #[must_use]
    pub const fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }
}
