//! Configuration-time validation for strategies and conditions.
//!
//! Validation runs when a strategy is registered or re-activated. Anything
//! rejected here is a caller error; nothing at evaluation time re-checks it.

use crate::error::AgentError;
use crate::strategy::{ComparisonOperator, Condition, PositionSizingModel, Strategy};
use rust_decimal::Decimal;

/// Validates a strategy, returning the first problem found.
///
/// # Errors
/// Returns [`AgentError::Validation`] if the strategy is malformed.
///
/// # Examples
/// ```
/// use defi_agent_core::strategy::{Condition, Strategy};
/// use defi_agent_core::validation::validate_strategy;
///
/// let strategy = Strategy::new("eth-dip", "ETH dip buyer", "mean_reversion")
///     .with_entry(Condition::new("rsi-low", "rsi", "<", 30.0));
/// assert!(validate_strategy(&strategy).is_ok());
///
/// let empty = Strategy::new("eth-dip", "ETH dip buyer", "mean_reversion");
/// assert!(validate_strategy(&empty).is_err());
/// ```
pub fn validate_strategy(strategy: &Strategy) -> Result<(), AgentError> {
    let problems = collect_problems(strategy);
    match problems.into_iter().next() {
        Some(reason) => Err(AgentError::validation(reason)),
        None => Ok(()),
    }
}

/// Returns every problem with `strategy`, in a stable order. Empty when valid.
#[must_use]
pub fn collect_problems(strategy: &Strategy) -> Vec<String> {
    let mut problems = Vec::new();

    if strategy.id.trim().is_empty() {
        problems.push("strategy id is empty".to_string());
    }
    if strategy.name.trim().is_empty() {
        problems.push(format!("strategy {}: name is empty", strategy.id));
    }
    if strategy.strategy_type.trim().is_empty() {
        problems.push(format!("strategy {}: strategy type is empty", strategy.id));
    }
    if strategy.is_active && strategy.entry_conditions.is_empty() {
        problems.push(format!(
            "strategy {}: active strategy has no entry conditions",
            strategy.id
        ));
    }

    for condition in strategy
        .entry_conditions
        .iter()
        .chain(strategy.exit_conditions.iter())
    {
        if let Err(reason) = validate_condition(condition) {
            problems.push(format!("strategy {}: {reason}", strategy.id));
        }
    }

    if let Err(reason) = validate_sizing_model(&strategy.sizing) {
        problems.push(format!("strategy {}: {reason}", strategy.id));
    }

    problems
}

/// Checks one condition: non-empty metric, a recognized operator, a usable weight.
///
/// # Errors
/// Returns a human-readable reason when the condition is malformed.
pub fn validate_condition(condition: &Condition) -> Result<(), String> {
    if condition.metric.trim().is_empty() {
        return Err(format!("condition {}: metric is empty", condition.id));
    }
    if condition.operator.trim().is_empty() {
        return Err(format!("condition {}: operator is empty", condition.id));
    }
    if ComparisonOperator::from_symbol(&condition.operator).is_none() {
        return Err(format!(
            "condition {}: unrecognized operator '{}'",
            condition.id, condition.operator
        ));
    }
    if !condition.weight.is_finite() || condition.weight < 0.0 {
        return Err(format!(
            "condition {}: weight must be a non-negative number, got {}",
            condition.id, condition.weight
        ));
    }
    if !condition.threshold.is_finite() {
        return Err(format!(
            "condition {}: threshold must be finite, got {}",
            condition.id, condition.threshold
        ));
    }
    Ok(())
}

/// Checks the payload of a sizing model.
///
/// # Errors
/// Returns a human-readable reason when a parameter is out of range.
pub fn validate_sizing_model(model: &PositionSizingModel) -> Result<(), String> {
    let unit = Decimal::ZERO..=Decimal::ONE;
    match model {
        PositionSizingModel::Kelly {
            win_probability,
            win_loss_ratio,
            max_fraction,
        } => {
            if !unit.contains(win_probability) {
                return Err(format!(
                    "kelly win probability must be in [0, 1], got {win_probability}"
                ));
            }
            if *win_loss_ratio <= Decimal::ZERO {
                return Err(format!(
                    "kelly win/loss ratio must be positive, got {win_loss_ratio}"
                ));
            }
            if !unit.contains(max_fraction) {
                return Err(format!(
                    "kelly max fraction must be in [0, 1], got {max_fraction}"
                ));
            }
        }
        PositionSizingModel::VolatilityTarget {
            target_volatility,
            lookback_days,
        } => {
            if !target_volatility.is_finite() || *target_volatility <= 0.0 {
                return Err(format!(
                    "target volatility must be positive, got {target_volatility}"
                ));
            }
            if *lookback_days == 0 {
                return Err("volatility lookback must be at least one day".to_string());
            }
        }
        PositionSizingModel::FixedFraction { fraction } => {
            if !unit.contains(fraction) {
                return Err(format!("fixed fraction must be in [0, 1], got {fraction}"));
            }
        }
    }
    Ok(())
}
