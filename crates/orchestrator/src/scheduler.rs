//! Periodic evaluation of active strategies.
//!
//! One interval loop drives the scheduler. Each tick takes a snapshot of the
//! active strategies and spawns one task per strategy into a [`JoinSet`]; the
//! loop reaps finished tasks between ticks and drains the rest when it stops.
//!
//! Per-strategy flow:
//! 1. Score entry and exit conditions.
//! 2. Exit score at or above the act threshold emits an exit intent.
//! 3. Otherwise an entry score at or above the act threshold, with the exit
//!    score below the hold threshold, goes through the risk gate and, if
//!    allowed, emits an entry intent sized by the position sizer.
//!
//! Provider and backend failures skip the strategy for that tick and never
//! stop the loop.

use crate::registry::StrategyRegistry;
use crate::stats::{SchedulerStats, SchedulerStatsSnapshot};
use chrono::Utc;
use defi_agent_core::config::SchedulerConfig;
use defi_agent_core::error::AgentError;
use defi_agent_core::events::{IntentKind, TradeIntent};
use defi_agent_core::position_sizing::{PositionSizer, SizingConfig};
use defi_agent_core::strategy::Strategy;
use defi_agent_core::traits::{
    ExecutionBackend, MetricValueProvider, PortfolioValueProvider, RiskSnapshotProvider,
};
use defi_agent_strategy::{ConditionEvaluator, RiskGate};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// External capabilities the scheduler depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub metrics: Arc<dyn MetricValueProvider>,
    pub portfolio: Arc<dyn PortfolioValueProvider>,
    pub risk: Arc<dyn RiskSnapshotProvider>,
    pub execution: Arc<dyn ExecutionBackend>,
}

/// Decision reached for one strategy on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Evaluation {
    /// Entry intent submitted for `amount` of capital.
    Enter { amount: Decimal },
    /// Exit intent submitted.
    Exit,
    /// Nothing qualified.
    Hold,
    /// Entry qualified but the risk gate vetoed it.
    Denied,
    /// Evaluation could not complete this tick.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEvaluation {
    pub strategy_id: String,
    pub entry_score: f64,
    pub exit_score: f64,
    pub decision: Evaluation,
}

/// State shared by the loop and every evaluation task.
struct Evaluator {
    registry: StrategyRegistry,
    conditions: ConditionEvaluator,
    gate: RiskGate,
    sizer: PositionSizer,
    portfolio: Arc<dyn PortfolioValueProvider>,
    risk: Arc<dyn RiskSnapshotProvider>,
    execution: Arc<dyn ExecutionBackend>,
    config: SchedulerConfig,
    stats: SchedulerStats,
}

impl Evaluator {
    /// Spawns one evaluation per active strategy; returns how many were spawned.
    async fn spawn_tick(
        self: &Arc<Self>,
        tasks: &mut JoinSet<StrategyEvaluation>,
        token: &CancellationToken,
    ) -> usize {
        self.stats.record_tick();
        let strategies = self.registry.active_snapshot().await;
        let count = strategies.len();

        for strategy in strategies {
            let evaluator = Arc::clone(self);
            let token = token.clone();
            tasks.spawn(async move { evaluator.evaluate(strategy, &token).await });
        }
        count
    }

    fn reap(&self, done: Result<StrategyEvaluation, JoinError>) -> Option<StrategyEvaluation> {
        match done {
            Ok(result) => Some(result),
            Err(e) => {
                error!("Evaluation task failed: {}", e);
                self.stats.record_failure();
                None
            }
        }
    }

    async fn evaluate(&self, strategy: Strategy, token: &CancellationToken) -> StrategyEvaluation {
        self.stats.record_evaluation();

        let (entry, exit) = tokio::join!(
            self.conditions.evaluate(&strategy.entry_conditions),
            self.conditions.evaluate(&strategy.exit_conditions),
        );

        let decision = self.decide(&strategy, entry.score, exit.score, token).await;
        debug!(
            strategy_id = %strategy.id,
            entry_score = entry.score,
            exit_score = exit.score,
            ?decision,
            "Strategy evaluated"
        );

        StrategyEvaluation {
            strategy_id: strategy.id,
            entry_score: entry.score,
            exit_score: exit.score,
            decision,
        }
    }

    async fn decide(
        &self,
        strategy: &Strategy,
        entry_score: f64,
        exit_score: f64,
        token: &CancellationToken,
    ) -> Evaluation {
        let act = self.config.act_threshold;

        if exit_score >= act {
            let intent = build_intent(strategy, IntentKind::Exit, None, entry_score, exit_score);
            return match self.submit(intent, token).await {
                Ok(()) => {
                    self.stats.record_exit();
                    info!(strategy_id = %strategy.id, exit_score, "Exit intent submitted");
                    Evaluation::Exit
                }
                Err(reason) => Evaluation::Skipped { reason },
            };
        }

        if entry_score < act || exit_score >= self.config.hold_threshold {
            return Evaluation::Hold;
        }

        let snapshot = match self.risk.risk_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(strategy_id = %strategy.id, error = %e, "Risk snapshot unavailable, skipping");
                self.stats.record_failure();
                return Evaluation::Skipped {
                    reason: format!("risk snapshot unavailable: {e}"),
                };
            }
        };

        if !self.gate.allow(strategy, &snapshot) {
            self.stats.record_denial();
            return Evaluation::Denied;
        }

        let portfolio_value = match self.portfolio.portfolio_value().await {
            Ok(value) => value,
            Err(e) => {
                warn!(strategy_id = %strategy.id, error = %e, "Portfolio value unavailable, skipping");
                self.stats.record_failure();
                return Evaluation::Skipped {
                    reason: format!("portfolio value unavailable: {e}"),
                };
            }
        };

        let amount = self.sizer.size(strategy, portfolio_value, snapshot.volatility);
        if amount <= Decimal::ZERO {
            debug!(strategy_id = %strategy.id, %amount, "Sized to nothing, no entry");
            return Evaluation::Skipped {
                reason: "position size is zero".to_string(),
            };
        }

        let intent = build_intent(
            strategy,
            IntentKind::Enter,
            Some(amount),
            entry_score,
            exit_score,
        );
        match self.submit(intent, token).await {
            Ok(()) => {
                self.stats.record_entry();
                info!(
                    strategy_id = %strategy.id,
                    entry_score,
                    %amount,
                    "Entry intent submitted"
                );
                Evaluation::Enter { amount }
            }
            Err(reason) => Evaluation::Skipped { reason },
        }
    }

    async fn submit(&self, intent: TradeIntent, token: &CancellationToken) -> Result<(), String> {
        if token.is_cancelled() {
            debug!(intent_id = %intent.id, "Scheduler stopping, intent dropped");
            return Err("scheduler stopping".to_string());
        }

        let intent_id = intent.id.clone();
        self.execution.submit(intent).await.map_err(|e| {
            warn!(intent_id = %intent_id, error = %e, "Execution backend rejected intent");
            self.stats.record_failure();
            format!("execution backend rejected intent: {e}")
        })
    }
}

fn build_intent(
    strategy: &Strategy,
    kind: IntentKind,
    amount: Option<Decimal>,
    entry_score: f64,
    exit_score: f64,
) -> TradeIntent {
    let now = Utc::now();
    TradeIntent {
        id: TradeIntent::make_id(&strategy.id, kind, now),
        strategy_id: strategy.id.clone(),
        strategy_name: strategy.name.clone(),
        kind,
        amount,
        entry_score,
        exit_score,
        stop_loss_pct: strategy.risk.stop_loss_pct,
        take_profit_pct: strategy.risk.take_profit_pct,
        max_leverage: strategy.risk.max_leverage,
        created_at: now,
    }
}

async fn run_loop(evaluator: Arc<Evaluator>, token: CancellationToken) {
    let period = evaluator.config.interval();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tasks: JoinSet<StrategyEvaluation> = JoinSet::new();

    info!(interval_secs = period.as_secs(), "Evaluation scheduler started");

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = interval.tick() => {
                while let Some(done) = tasks.try_join_next() {
                    evaluator.reap(done);
                }
                let spawned = evaluator.spawn_tick(&mut tasks, &token).await;
                debug!(strategies = spawned, in_flight = tasks.len(), "Tick dispatched");
            }
        }
    }

    let draining = tasks.len();
    while let Some(done) = tasks.join_next().await {
        evaluator.reap(done);
    }
    info!(drained = draining, "Evaluation scheduler stopped");
}

struct RunningLoop {
    token: CancellationToken,
    /// Cancelled once the loop task has drained and exited, panics included.
    finished: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RunningLoop {
    fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }
}

/// Runs the evaluation loop over a [`StrategyRegistry`].
///
/// `Stopped → start → Running → stop / parent cancelled → Stopped`.
/// Starting while running fails with [`AgentError::AlreadyRunning`]; stopping
/// while stopped does nothing. `stop` returns only after in-flight
/// evaluations have finished.
pub struct EvaluationScheduler {
    evaluator: Arc<Evaluator>,
    running: Mutex<Option<RunningLoop>>,
}

impl EvaluationScheduler {
    #[must_use]
    pub fn new(
        registry: StrategyRegistry,
        collaborators: Collaborators,
        config: SchedulerConfig,
        sizing: SizingConfig,
    ) -> Self {
        let evaluator = Evaluator {
            registry,
            conditions: ConditionEvaluator::new(collaborators.metrics),
            gate: RiskGate::new(),
            sizer: PositionSizer::new(sizing),
            portfolio: collaborators.portfolio,
            risk: collaborators.risk,
            execution: collaborators.execution,
            config,
            stats: SchedulerStats::default(),
        };
        Self {
            evaluator: Arc::new(evaluator),
            running: Mutex::new(None),
        }
    }

    /// Starts the loop as a child of `parent`; cancelling `parent` stops it too.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`AgentError::AlreadyRunning`] if the loop is already running.
    pub fn start(&self, parent: &CancellationToken) -> Result<(), AgentError> {
        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|r| !r.is_finished()) {
            warn!("Start requested while scheduler is running or draining");
            return Err(AgentError::AlreadyRunning);
        }

        let token = parent.child_token();
        let finished = CancellationToken::new();
        let done = finished.clone().drop_guard();
        let evaluator = Arc::clone(&self.evaluator);
        let loop_token = token.clone();
        let handle = tokio::spawn(async move {
            let _done = done;
            run_loop(evaluator, loop_token).await;
        });
        *running = Some(RunningLoop {
            token,
            finished,
            handle: Some(handle),
        });
        Ok(())
    }

    /// Stops the loop and waits for in-flight evaluations to drain.
    ///
    /// The loop stays in the slot until it has exited, so concurrent callers
    /// all wait for the same drain and `start` keeps failing until it is done.
    pub async fn stop(&self) {
        let finished = {
            let running = self.running.lock();
            let Some(current) = running.as_ref() else {
                debug!("Stop requested while scheduler is stopped");
                return;
            };
            current.token.cancel();
            current.finished.clone()
        };

        finished.cancelled().await;

        let handle = {
            let mut running = self.running.lock();
            match running.as_mut() {
                // A newer loop may have been started once the drain finished.
                Some(current) if current.finished.is_cancelled() => current.handle.take(),
                _ => None,
            }
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Scheduler loop ended abnormally: {}", e);
            }
        }
    }

    /// `true` from `start` until the loop has drained and exited.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.lock().as_ref().is_some_and(|r| !r.is_finished())
    }

    /// Runs a single tick and waits for every evaluation, ordered by strategy id.
    ///
    /// Independent of the running loop; counted in [`Self::stats`] like a regular tick.
    pub async fn evaluate_once(&self) -> Vec<StrategyEvaluation> {
        let token = CancellationToken::new();
        let mut tasks = JoinSet::new();
        self.evaluator.spawn_tick(&mut tasks, &token).await;

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(done) = tasks.join_next().await {
            if let Some(result) = self.evaluator.reap(done) {
                results.push(result);
            }
        }
        results.sort_by(|a, b| a.strategy_id.cmp(&b.strategy_id));
        results
    }

    #[must_use]
    pub fn stats(&self) -> SchedulerStatsSnapshot {
        self.evaluator.stats.snapshot()
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.evaluator.config
    }
}

impl Drop for EvaluationScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.token.cancel();
        }
    }
}
