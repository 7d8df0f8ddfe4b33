pub mod condition_evaluator;
pub mod risk_gate;

pub use condition_evaluator::{weighted_score, ConditionEvaluator, ConditionResult, ConditionScore};
pub use risk_gate::{RiskBreach, RiskGate};
