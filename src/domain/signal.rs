//! Trade signal types: the recommendation a strategy or the engine emits.

use std::collections::BTreeMap;

use serde::Serialize;

use super::regime::MarketRegime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    Buy,
    Sell,
    NoTrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskRating {
    Low,
    Medium,
    High,
}

/// Single trade recommendation.
///
/// Immutable once created; consumed by callers for display, persistence, or
/// as the seed of a simulation. A `NoTrade` signal carries no entry, stop, or
/// take-profit data.
#[derive(Debug, Clone, Serialize)]
pub struct TradeSignal {
    pub symbol: String,
    pub timeframe: String,
    pub action: TradeAction,
    pub strategy_name: String,
    pub entry_zone: Option<(f64, f64)>,
    pub stop_loss: Option<f64>,
    pub take_profits: Option<Vec<f64>>,
    pub risk_rating: RiskRating,
    pub confidence_score: f64,
    pub regime: MarketRegime,
    /// Named numeric values backing the signal, for explanation and auditing.
    pub context: BTreeMap<String, f64>,
}

impl TradeSignal {
    /// The explicit "no actionable setup" placeholder callers receive when
    /// every eligible strategy abstained.
    pub fn no_trade(symbol: &str, timeframe: &str) -> Self {
        TradeSignal {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            action: TradeAction::NoTrade,
            strategy_name: "NoValidSetup".to_string(),
            entry_zone: None,
            stop_loss: None,
            take_profits: None,
            risk_rating: RiskRating::Low,
            confidence_score: 0.0,
            regime: MarketRegime::Unknown,
            context: BTreeMap::new(),
        }
    }
}
