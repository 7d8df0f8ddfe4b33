use chrono::Utc;
use defi_agent_core::error::AgentError;
use defi_agent_core::strategy::Strategy;
use defi_agent_core::validation::validate_strategy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the configured strategies.
///
/// Cloning yields another handle to the same set. Mutations take the write
/// lock; evaluations read cloned snapshots so no lock is held across provider I/O.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: Arc<RwLock<HashMap<String, Strategy>>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Validates and inserts a strategy, stamping its creation and update times.
    ///
    /// # Errors
    /// Returns [`AgentError::Validation`] if the strategy is malformed, or
    /// [`AgentError::DuplicateId`] if the id is taken. The registry is unchanged on error.
    pub async fn add(&self, mut strategy: Strategy) -> Result<(), AgentError> {
        validate_strategy(&strategy)?;

        let mut strategies = self.strategies.write().await;
        if strategies.contains_key(&strategy.id) {
            return Err(AgentError::DuplicateId { id: strategy.id });
        }

        let now = Utc::now();
        strategy.created_at = now;
        strategy.updated_at = now;

        tracing::info!(
            strategy_id = %strategy.id,
            strategy_type = %strategy.strategy_type,
            active = strategy.is_active,
            "Registered strategy {}",
            strategy.name
        );
        strategies.insert(strategy.id.clone(), strategy);
        Ok(())
    }

    /// Removes a strategy and returns it.
    ///
    /// # Errors
    /// Returns [`AgentError::NotFound`] if no strategy has this id.
    pub async fn remove(&self, id: &str) -> Result<Strategy, AgentError> {
        let removed = self.strategies.write().await.remove(id);
        match removed {
            Some(strategy) => {
                tracing::info!(strategy_id = %id, "Removed strategy");
                Ok(strategy)
            }
            None => Err(AgentError::NotFound { id: id.to_string() }),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Strategy> {
        self.strategies.read().await.get(id).cloned()
    }

    /// All strategies, ordered by id.
    pub async fn list(&self) -> Vec<Strategy> {
        let mut all: Vec<Strategy> = self.strategies.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Cloned active strategies, ordered by id.
    pub async fn active_snapshot(&self) -> Vec<Strategy> {
        let mut active: Vec<Strategy> = self
            .strategies
            .read()
            .await
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        active
    }

    pub async fn len(&self) -> usize {
        self.strategies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.strategies.read().await.is_empty()
    }

    /// Records a closed trade against the strategy's performance counters.
    ///
    /// # Errors
    /// Returns [`AgentError::NotFound`] if no strategy has this id.
    pub async fn record_trade_result(&self, id: &str, pnl: Decimal) -> Result<(), AgentError> {
        let mut strategies = self.strategies.write().await;
        let strategy = strategies
            .get_mut(id)
            .ok_or_else(|| AgentError::NotFound { id: id.to_string() })?;

        strategy.performance.record(pnl);
        strategy.updated_at = Utc::now();

        tracing::debug!(
            strategy_id = %id,
            %pnl,
            trades = strategy.performance.trade_count,
            win_rate = strategy.performance.win_rate(),
            "Recorded trade result"
        );
        Ok(())
    }

    /// Activates or deactivates a strategy.
    ///
    /// Activation re-runs validation against the stored definition.
    ///
    /// # Errors
    /// Returns [`AgentError::NotFound`] for an unknown id, or
    /// [`AgentError::Validation`] if the strategy cannot be active as configured.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), AgentError> {
        let mut strategies = self.strategies.write().await;
        let strategy = strategies
            .get_mut(id)
            .ok_or_else(|| AgentError::NotFound { id: id.to_string() })?;

        if strategy.is_active == active {
            return Ok(());
        }

        if active {
            let mut candidate = strategy.clone();
            candidate.is_active = true;
            validate_strategy(&candidate)?;
        }

        strategy.is_active = active;
        strategy.updated_at = Utc::now();
        tracing::info!(strategy_id = %id, active, "Strategy activation changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_agent_core::strategy::Condition;
    use rust_decimal_macros::dec;

    fn strategy(id: &str) -> Strategy {
        Strategy::new(id, format!("Strategy {id}"), "momentum")
            .with_entry(Condition::new("e1", "rsi", "<", 30.0))
    }

    #[tokio::test]
    async fn add_and_get() {
        let registry = StrategyRegistry::new();
        registry.add(strategy("a")).await.unwrap();

        let stored = registry.get("a").await.unwrap();
        assert_eq!(stored.name, "Strategy a");
        assert_eq!(stored.created_at, stored.updated_at);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_id_leaves_registry_unchanged() {
        let registry = StrategyRegistry::new();
        registry.add(strategy("a")).await.unwrap();
        let before = registry.get("a").await.unwrap();

        let mut other = strategy("a");
        other.name = "Impostor".to_string();
        let err = registry.add(other).await.unwrap_err();

        assert_eq!(err, AgentError::DuplicateId { id: "a".to_string() });
        assert_eq!(registry.len().await, 1);
        let after = registry.get("a").await.unwrap();
        assert_eq!(after.name, before.name);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn invalid_strategy_rejected() {
        let registry = StrategyRegistry::new();
        let err = registry
            .add(Strategy::new("empty", "Empty", "momentum"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation { .. }));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn remove_unknown_is_not_found() {
        let registry = StrategyRegistry::new();
        assert_eq!(
            registry.remove("ghost").await.unwrap_err(),
            AgentError::NotFound {
                id: "ghost".to_string()
            }
        );

        registry.add(strategy("a")).await.unwrap();
        assert_eq!(registry.remove("a").await.unwrap().id, "a");
        assert!(registry.get("a").await.is_none());
    }

    #[tokio::test]
    async fn snapshots_are_sorted_and_filtered() {
        let registry = StrategyRegistry::new();
        registry.add(strategy("c")).await.unwrap();
        registry.add(strategy("a")).await.unwrap();
        registry
            .add(Strategy::new("b", "Parked", "yield").with_active(false))
            .await
            .unwrap();

        let ids: Vec<String> = registry.list().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let active: Vec<String> = registry
            .active_snapshot()
            .await
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(active, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn record_trade_result_updates_counters() {
        let registry = StrategyRegistry::new();
        registry.add(strategy("a")).await.unwrap();

        registry.record_trade_result("a", dec!(120)).await.unwrap();
        registry.record_trade_result("a", dec!(-40)).await.unwrap();
        registry.record_trade_result("a", dec!(0)).await.unwrap();

        let perf = registry.get("a").await.unwrap().performance;
        assert_eq!(perf.trade_count, 3);
        assert_eq!(perf.wins, 1);
        assert_eq!(perf.losses, 2);
        assert_eq!(perf.total_pnl, dec!(80));

        assert!(matches!(
            registry.record_trade_result("ghost", dec!(1)).await,
            Err(AgentError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn activation_revalidates() {
        let registry = StrategyRegistry::new();
        registry
            .add(Strategy::new("parked", "Parked", "yield").with_active(false))
            .await
            .unwrap();

        let err = registry.set_active("parked", true).await.unwrap_err();
        assert!(matches!(err, AgentError::Validation { .. }));
        assert!(!registry.get("parked").await.unwrap().is_active);

        registry.add(strategy("a")).await.unwrap();
        registry.set_active("a", false).await.unwrap();
        assert!(registry.active_snapshot().await.is_empty());
        registry.set_active("a", true).await.unwrap();
        assert_eq!(registry.active_snapshot().await.len(), 1);
    }
}
