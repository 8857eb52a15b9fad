//! Strategy contract and the built-in strategies.
//!
//! A strategy inspects an indicator-complete candle window plus the current
//! regime and either proposes a trade, abstains, or faults. Faults are the
//! strategy's internal failures; callers log them and move on rather than
//! letting one bad strategy take down signal generation.

mod range_reversion;
mod registry;
mod trend_continuation;

pub use range_reversion::RangeReversion;
pub use registry::StrategyRegistry;
pub use trend_continuation::TrendContinuation;

use super::candle::Candle;
use super::regime::MarketRegime;
use super::signal::TradeSignal;

/// Outcome of asking a strategy for a proposal.
#[derive(Debug, Clone)]
pub enum Evaluation {
    /// An actionable trade recommendation.
    Proposal(TradeSignal),
    /// Conditions inspected, no setup found. Not an error.
    Abstain,
    /// The strategy could not evaluate at all (missing inputs, internal
    /// inconsistency). Isolated by the caller.
    Fault(String),
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Regimes this strategy is designed for. The registry routes on these;
    /// strategies still re-check inside `propose` and abstain on a mismatch.
    fn regimes(&self) -> &'static [MarketRegime];
    fn propose(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: &str,
        regime: MarketRegime,
    ) -> Evaluation;
}
