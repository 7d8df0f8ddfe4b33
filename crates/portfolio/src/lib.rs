//! Portfolio-level checks that run on demand, outside the evaluation loop.
//!
//! - [`PortfolioRiskAssessor`] scores how concentrated and levered the book is.
//! - [`RebalanceActionPlanner`] lists the trades that bring drifted assets back to target.
//!
//! Both take read-only snapshots owned by the caller and keep nothing between calls.

pub mod rebalance;
pub mod risk_assessor;

pub use rebalance::RebalanceActionPlanner;
pub use risk_assessor::{herfindahl_index, PortfolioRiskAssessor};
