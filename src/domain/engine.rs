//! Signal generation orchestrator.
//!
//! Fetches candles through the data port, annotates them, classifies the
//! regime, consults the registered strategies for that regime, and picks the
//! highest-confidence proposal. A faulting strategy is logged and skipped so
//! the remaining strategies still get their turn.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use super::candle::Candle;
use super::error::ChartistError;
use super::indicators::{annotate, drop_incomplete};
use super::regime::{classify, volatility_regime, MarketRegime};
use super::signal::{RiskRating, TradeAction, TradeSignal};
use super::strategy::{Evaluation, StrategyRegistry};
use crate::ports::candle_port::CandlePort;

pub struct SignalEngine {
    port: Box<dyn CandlePort>,
    registry: StrategyRegistry,
}

impl SignalEngine {
    pub fn new(port: Box<dyn CandlePort>) -> Self {
        SignalEngine {
            port,
            registry: StrategyRegistry::with_default_strategies(),
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Generate at most one signal for a symbol/timeframe.
    ///
    /// `Ok(None)` means there was nothing to act on: no data survived
    /// annotation or every eligible strategy abstained. Data source errors
    /// propagate. `enabled` restricts the consulted strategies by name;
    /// `None` allows all registered ones.
    pub fn generate(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
        demo: bool,
        enabled: Option<&[String]>,
    ) -> Result<Option<TradeSignal>, ChartistError> {
        let raw = if demo {
            demo_candles(limit)
        } else {
            self.port.fetch_candles(symbol, timeframe, limit)?
        };
        if raw.is_empty() {
            return Ok(None);
        }

        let candles = drop_incomplete(annotate(&raw));
        if candles.is_empty() {
            return Ok(None);
        }

        // Demo data is a synthetic uptrend; classifying it would only add
        // noise from the short window.
        let regime = if demo {
            MarketRegime::TrendUp
        } else {
            classify(&candles)
        };
        debug!(
            %regime,
            volatility = ?volatility_regime(&candles[candles.len() - 1]),
            bars = candles.len(),
            "classified window"
        );

        let strategies: Vec<_> = self
            .registry
            .for_regime(regime)
            .into_iter()
            .filter(|s| match enabled {
                Some(names) => names.iter().any(|n| n == s.name()),
                None => true,
            })
            .collect();

        let mut best: Option<TradeSignal> = None;
        for strategy in strategies {
            match strategy.propose(&candles, symbol, timeframe, regime) {
                Evaluation::Proposal(signal) => {
                    let better = match &best {
                        Some(current) => signal.confidence_score > current.confidence_score,
                        None => true,
                    };
                    if better {
                        best = Some(signal);
                    }
                }
                Evaluation::Abstain => {}
                Evaluation::Fault(reason) => {
                    warn!(strategy = strategy.name(), %reason, "strategy fault, skipping");
                }
            }
        }

        if best.is_none() && demo {
            // Demo mode always demonstrates a full signal payload.
            best = Some(demo_fallback(symbol, timeframe, &candles));
        }

        Ok(best)
    }
}

/// The oscillator warmup trims 14 bars, so the synthetic series keeps a
/// floor above that no matter how small a `limit` the caller asked for.
const DEMO_MIN_BARS: usize = 30;

/// Synthetic uptrend used when no live data source is wired up:
/// close = 100 + 0.5·i with ±1% wicks, 5-minute spacing ending now.
fn demo_candles(limit: usize) -> Vec<Candle> {
    let limit = limit.max(DEMO_MIN_BARS);
    let now = Utc::now();
    (0..limit)
        .map(|i| {
            let close = 100.0 + i as f64 * 0.5;
            Candle::new(
                now - Duration::minutes(5 * (limit - 1 - i) as i64),
                close,
                close * 1.01,
                close * 0.99,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Canned BUY around the latest close, emitted when even the demo data
/// produces no organic setup (the synthetic trend is too clean for the
/// oscillator gates).
fn demo_fallback(symbol: &str, timeframe: &str, candles: &[Candle]) -> TradeSignal {
    let last = &candles[candles.len() - 1];
    let price = last.close;

    let mut context = BTreeMap::new();
    context.insert("close".to_string(), price);
    context.insert("ema20".to_string(), last.ema20.unwrap_or(price));
    context.insert("ema50".to_string(), last.ema50.unwrap_or(price));
    context.insert("rsi14".to_string(), last.rsi14.unwrap_or(55.0));

    TradeSignal {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        action: TradeAction::Buy,
        strategy_name: "DemoTrendContinuation".to_string(),
        entry_zone: Some((price * 0.995, price * 1.005)),
        stop_loss: Some(price * 0.985),
        take_profits: Some(vec![price * 1.02, price * 1.04]),
        risk_rating: RiskRating::Medium,
        confidence_score: 0.9,
        regime: MarketRegime::TrendUp,
        context,
    }
}
