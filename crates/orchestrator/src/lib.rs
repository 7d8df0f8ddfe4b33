pub mod engine;
pub mod registry;
pub mod scheduler;
pub mod stats;

pub use engine::StrategyEngine;
pub use registry::StrategyRegistry;
pub use scheduler::{Collaborators, Evaluation, EvaluationScheduler, StrategyEvaluation};
pub use stats::{SchedulerStats, SchedulerStatsSnapshot};
