//! Strategy data model: conditions, sizing models, risk limits and counters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Opaque key/value bag attached to a condition and handed to the metric provider.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Comparison applied between a metric's current value and a condition threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// `>`
    #[serde(rename = ">")]
    GreaterThan,
    /// `<`
    #[serde(rename = "<")]
    LessThan,
    /// `==`
    #[serde(rename = "==")]
    Equal,
    /// `>=`
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// `<=`
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl ComparisonOperator {
    /// Every recognized operator.
    pub const ALL: [Self; 5] = [
        Self::GreaterThan,
        Self::LessThan,
        Self::Equal,
        Self::GreaterOrEqual,
        Self::LessOrEqual,
    ];

    /// Parses one of the five recognized symbols.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            ">" => Some(Self::GreaterThan),
            "<" => Some(Self::LessThan),
            "==" => Some(Self::Equal),
            ">=" => Some(Self::GreaterOrEqual),
            "<=" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    /// The symbol this operator is written as.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equal => "==",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }

    /// Applies the comparison `value <op> threshold`.
    ///
    /// NaN never satisfies any comparison.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::Equal => value == threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| format!("unrecognized operator '{s}'"))
    }
}

/// A weighted metric/threshold test.
///
/// The operator is kept as written so that a configuration with an unknown
/// symbol can still be loaded, rejected by validation, and scored as "not met".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    /// Metric key resolved by the metric provider (e.g. "rsi", "price_change_24h").
    pub metric: String,
    pub operator: String,
    pub threshold: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// How long the comparison should hold, in seconds (hint for the provider).
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Aggregation the provider should apply over the duration (e.g. "avg").
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

const fn default_weight() -> f64 {
    1.0
}

impl Condition {
    /// Creates a condition with weight 1.0 and no hints.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        metric: impl Into<String>,
        operator: impl Into<String>,
        threshold: f64,
    ) -> Self {
        Self {
            id: id.into(),
            metric: metric.into(),
            operator: operator.into(),
            threshold,
            weight: default_weight(),
            duration_secs: None,
            aggregation: None,
            metadata: Metadata::new(),
        }
    }

    /// Builder method to set the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Builder method to add a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builder method to set the duration and aggregation hints.
    #[must_use]
    pub fn with_window(mut self, duration_secs: u64, aggregation: impl Into<String>) -> Self {
        self.duration_secs = Some(duration_secs);
        self.aggregation = Some(aggregation.into());
        self
    }

    /// The parsed operator, or `None` if the symbol is not recognized.
    #[must_use]
    pub fn parsed_operator(&self) -> Option<ComparisonOperator> {
        ComparisonOperator::from_symbol(&self.operator)
    }
}

/// How capital is allocated to a single trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PositionSizingModel {
    /// Kelly criterion for a bet with win probability `p` and win/loss ratio `b`.
    Kelly {
        win_probability: Decimal,
        win_loss_ratio: Decimal,
        max_fraction: Decimal,
    },
    /// Scale exposure so that position volatility tracks a target.
    VolatilityTarget {
        target_volatility: f64,
        lookback_days: u32,
    },
    /// A constant share of the portfolio.
    FixedFraction { fraction: Decimal },
}

impl Default for PositionSizingModel {
    fn default() -> Self {
        Self::FixedFraction {
            fraction: dec!(0.02),
        }
    }
}

impl PositionSizingModel {
    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Kelly { .. } => "kelly",
            Self::VolatilityTarget { .. } => "volatility_target",
            Self::FixedFraction { .. } => "fixed_fraction",
        }
    }
}

/// Per-strategy risk limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParameters {
    /// Maximum tolerated portfolio drawdown (0.15 = 15%).
    pub max_drawdown: f64,
    /// Maximum tolerated value-at-risk, as a fraction of the portfolio.
    pub value_at_risk: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_leverage: f64,
    /// Maximum tolerated market volatility.
    pub volatility_limit: f64,
    pub correlation_limit: f64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            max_drawdown: 0.15,
            value_at_risk: 0.05,
            stop_loss_pct: 0.05,
            take_profit_pct: 0.10,
            max_leverage: 1.0,
            volatility_limit: 0.5,
            correlation_limit: 0.7,
        }
    }
}

/// Realized trade statistics for a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceCounters {
    pub trade_count: u64,
    pub wins: u64,
    pub losses: u64,
    pub total_pnl: Decimal,
}

impl PerformanceCounters {
    /// Records one closed trade. A zero `PnL` counts as a loss.
    pub fn record(&mut self, pnl: Decimal) {
        self.trade_count += 1;
        if pnl > Decimal::ZERO {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.total_pnl += pnl;
    }

    /// Fraction of trades that were winners, 0.0 before the first trade.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn win_rate(&self) -> f64 {
        if self.trade_count == 0 {
            0.0
        } else {
            self.wins as f64 / self.trade_count as f64
        }
    }
}

/// A configured trading strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    /// Free-form family tag (e.g. "momentum", "mean_reversion", "yield").
    pub strategy_type: String,
    #[serde(default)]
    pub entry_conditions: Vec<Condition>,
    #[serde(default)]
    pub exit_conditions: Vec<Condition>,
    #[serde(default)]
    pub sizing: PositionSizingModel,
    #[serde(default)]
    pub risk: RiskParameters,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub performance: PerformanceCounters,
}

const fn default_active() -> bool {
    true
}

impl Strategy {
    /// Creates an active strategy with no conditions, default sizing and default limits.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        strategy_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            strategy_type: strategy_type.into(),
            entry_conditions: Vec::new(),
            exit_conditions: Vec::new(),
            sizing: PositionSizingModel::default(),
            risk: RiskParameters::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
            performance: PerformanceCounters::default(),
        }
    }

    /// Builder method to append an entry condition.
    #[must_use]
    pub fn with_entry(mut self, condition: Condition) -> Self {
        self.entry_conditions.push(condition);
        self
    }

    /// Builder method to append an exit condition.
    #[must_use]
    pub fn with_exit(mut self, condition: Condition) -> Self {
        self.exit_conditions.push(condition);
        self
    }

    /// Builder method to set the sizing model.
    #[must_use]
    pub fn with_sizing(mut self, sizing: PositionSizingModel) -> Self {
        self.sizing = sizing;
        self
    }

    /// Builder method to set the risk limits.
    #[must_use]
    pub fn with_risk(mut self, risk: RiskParameters) -> Self {
        self.risk = risk;
        self
    }

    /// Builder method to set the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}
