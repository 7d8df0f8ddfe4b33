use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a trade intent opens or closes a strategy's exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Enter,
    Exit,
}

/// A sized trade decision handed to the execution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIntent {
    pub id: String,
    pub strategy_id: String,
    pub strategy_name: String,
    pub kind: IntentKind,
    /// Capital to commit for an entry; `None` for an exit (close everything).
    pub amount: Option<Decimal>,
    pub entry_score: f64,
    pub exit_score: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_leverage: f64,
    pub created_at: DateTime<Utc>,
}

impl TradeIntent {
    /// Builds the intent id from strategy, kind and creation time.
    #[must_use]
    pub fn make_id(strategy_id: &str, kind: IntentKind, at: DateTime<Utc>) -> String {
        let tag = match kind {
            IntentKind::Enter => "enter",
            IntentKind::Exit => "exit",
        };
        format!("{strategy_id}-{tag}-{}", at.timestamp_millis())
    }
}
