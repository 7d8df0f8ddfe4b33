//! Weighted condition scoring.
//!
//! A strategy's entry or exit side is a list of weighted metric/threshold
//! conditions. The score is the share of total weight carried by the
//! conditions that currently hold, so it always lies in `[0, 1]`.
//!
//! # Error Handling
//!
//! Nothing here fails. A metric provider error or an unrecognized operator
//! makes that one condition "not met" and is logged.

use defi_agent_core::strategy::{Condition, Metadata};
use defi_agent_core::traits::MetricValueProvider;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of checking one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub condition_id: String,
    /// Value the provider reported, `None` if the lookup failed.
    pub value: Option<f64>,
    pub met: bool,
    /// Weight counted towards the total (negative or non-finite weights count as zero).
    pub weight: f64,
}

/// Score of a condition list plus the per-condition detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionScore {
    pub score: f64,
    /// Raw sum of met weights; may overflow to infinity for very large weights.
    pub met_weight: f64,
    pub total_weight: f64,
    pub results: Vec<ConditionResult>,
}

impl ConditionScore {
    /// Score of an empty condition list.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            score: 0.0,
            met_weight: 0.0,
            total_weight: 0.0,
            results: Vec::new(),
        }
    }

    /// Number of conditions whose metric lookup failed.
    #[must_use]
    pub fn lookup_failures(&self) -> usize {
        self.results.iter().filter(|r| r.value.is_none()).count()
    }
}

/// Scores condition lists against live metric values.
#[derive(Clone)]
pub struct ConditionEvaluator {
    metrics: Arc<dyn MetricValueProvider>,
}

impl ConditionEvaluator {
    #[must_use]
    pub fn new(metrics: Arc<dyn MetricValueProvider>) -> Self {
        Self { metrics }
    }

    /// Weighted share of conditions that hold, in `[0, 1]`.
    ///
    /// An empty list and a list whose total weight is zero both score `0.0`.
    pub async fn score(&self, conditions: &[Condition]) -> f64 {
        self.evaluate(conditions).await.score
    }

    /// Evaluates every condition and returns the score with per-condition detail.
    ///
    /// Metric lookups run concurrently; each condition sees its own reading.
    pub async fn evaluate(&self, conditions: &[Condition]) -> ConditionScore {
        if conditions.is_empty() {
            return ConditionScore::empty();
        }

        let results = join_all(conditions.iter().map(|c| self.check(c))).await;
        let (met_weight, total_weight) = weight_sums(&results, 1.0);

        // Sums of very large finite weights overflow to infinity; score on
        // weights scaled by the largest one instead.
        let max_weight = results.iter().map(|r| r.weight).fold(0.0, f64::max);
        let score = if max_weight > 0.0 {
            let (met, total) = weight_sums(&results, max_weight);
            weighted_score(met, total)
        } else {
            0.0
        };

        ConditionScore {
            score,
            met_weight,
            total_weight,
            results,
        }
    }

    /// Whether a single condition currently holds.
    pub async fn is_met(&self, condition: &Condition) -> bool {
        self.check(condition).await.met
    }

    async fn check(&self, condition: &Condition) -> ConditionResult {
        let weight = effective_weight(condition.weight);

        let Some(operator) = condition.parsed_operator() else {
            warn!(
                condition = %condition.id,
                operator = %condition.operator,
                "Unrecognized operator, treating condition as not met"
            );
            return ConditionResult {
                condition_id: condition.id.clone(),
                value: None,
                met: false,
                weight,
            };
        };

        let metadata = lookup_metadata(condition);
        match self.metrics.metric_value(&condition.metric, &metadata).await {
            Ok(value) => {
                let met = operator.compare(value, condition.threshold);
                debug!(
                    condition = %condition.id,
                    metric = %condition.metric,
                    value,
                    operator = %operator,
                    threshold = condition.threshold,
                    met,
                    "Condition evaluated"
                );
                ConditionResult {
                    condition_id: condition.id.clone(),
                    value: Some(value),
                    met,
                    weight,
                }
            }
            Err(e) => {
                warn!(
                    condition = %condition.id,
                    metric = %condition.metric,
                    error = %e,
                    "Metric lookup failed, treating condition as not met"
                );
                ConditionResult {
                    condition_id: condition.id.clone(),
                    value: None,
                    met: false,
                    weight,
                }
            }
        }
    }
}

/// `met / total`, or `0.0` when nothing carries weight.
#[must_use]
pub fn weighted_score(met_weight: f64, total_weight: f64) -> f64 {
    if total_weight <= 0.0 || !total_weight.is_finite() {
        return 0.0;
    }
    (met_weight / total_weight).clamp(0.0, 1.0)
}

/// `(met, total)` weight sums with every weight divided by `scale`.
fn weight_sums(results: &[ConditionResult], scale: f64) -> (f64, f64) {
    results.iter().fold((0.0, 0.0), |(met, total), r| {
        let weight = r.weight / scale;
        (if r.met { met + weight } else { met }, total + weight)
    })
}

fn effective_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Condition metadata with the duration/aggregation hints folded in for the provider.
fn lookup_metadata(condition: &Condition) -> Metadata {
    let mut metadata = condition.metadata.clone();
    if let Some(secs) = condition.duration_secs {
        metadata
            .entry("duration_secs".to_string())
            .or_insert_with(|| serde_json::Value::from(secs));
    }
    if let Some(ref aggregation) = condition.aggregation {
        metadata
            .entry("aggregation".to_string())
            .or_insert_with(|| serde_json::Value::from(aggregation.clone()));
    }
    metadata
}
