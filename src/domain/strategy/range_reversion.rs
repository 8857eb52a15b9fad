//! Range-reversion strategy: fade the edges of a sideways market.

use std::collections::BTreeMap;

use super::{Evaluation, Strategy};
use crate::domain::candle::Candle;
use crate::domain::regime::MarketRegime;
use crate::domain::signal::{RiskRating, TradeAction, TradeSignal};

const RANGE_LOOKBACK: usize = 50;
/// Windows whose high/low span exceeds this fraction of the mean close are
/// too wide to mean-revert reliably.
const MAX_RANGE_WIDTH: f64 = 0.08;
const OVERSOLD: f64 = 38.0;
const OVERBOUGHT: f64 = 62.0;

pub struct RangeReversion;

impl Strategy for RangeReversion {
    fn name(&self) -> &'static str {
        "RangeReversion"
    }

    fn description(&self) -> &'static str {
        "Fades the boundaries of an established trading range"
    }

    fn regimes(&self) -> &'static [MarketRegime] {
        &[MarketRegime::Range, MarketRegime::Choppy]
    }

    fn propose(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: &str,
        regime: MarketRegime,
    ) -> Evaluation {
        if regime != MarketRegime::Range {
            return Evaluation::Abstain;
        }
        let last = match candles.last() {
            Some(c) => c,
            None => return Evaluation::Fault("empty candle window".to_string()),
        };
        // The oscillator is this strategy's primary input, not optional
        // context; without it there is nothing to evaluate.
        let rsi = match last.rsi14 {
            Some(v) => v,
            None => return Evaluation::Fault("oscillator missing on latest candle".to_string()),
        };
        let close = last.close;

        let recent = if candles.len() > RANGE_LOOKBACK {
            &candles[candles.len() - RANGE_LOOKBACK..]
        } else {
            candles
        };
        let range_high = recent.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let range_low = recent.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let mean_close = recent.iter().map(|c| c.close).sum::<f64>() / recent.len() as f64;

        if (range_high - range_low) / mean_close.max(1e-9) > MAX_RANGE_WIDTH {
            return Evaluation::Abstain;
        }

        let support = (range_low * 0.995, range_low * 1.01);
        let resistance = (range_high * 0.99, range_high * 1.005);

        let mut context = BTreeMap::new();
        context.insert("close".to_string(), close);
        context.insert("rsi14".to_string(), rsi);
        context.insert("range_high".to_string(), range_high);
        context.insert("range_low".to_string(), range_low);

        if close >= support.0 && close <= support.1 && rsi < OVERSOLD {
            return Evaluation::Proposal(TradeSignal {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                action: TradeAction::Buy,
                strategy_name: self.name().to_string(),
                entry_zone: Some(support),
                stop_loss: Some(range_low * 0.99),
                take_profits: Some(vec![close * 1.03]),
                risk_rating: RiskRating::Medium,
                confidence_score: 0.6,
                regime,
                context,
            });
        }

        if close >= resistance.0 && close <= resistance.1 && rsi > OVERBOUGHT {
            return Evaluation::Proposal(TradeSignal {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                action: TradeAction::Sell,
                strategy_name: self.name().to_string(),
                entry_zone: Some(resistance),
                stop_loss: Some(range_high * 1.01),
                take_profits: Some(vec![close * 0.97]),
                risk_rating: RiskRating::High,
                confidence_score: 0.6,
                regime,
                context,
            });
        }

        Evaluation::Abstain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Flat range: highs 101, lows 99, closes 100 except the last.
    fn range_series(last_close: f64, rsi: Option<f64>) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..60)
            .map(|i| {
                let close = if i == 59 { last_close } else { 100.0 };
                let mut c = Candle::new(
                    start + Duration::minutes(5 * i as i64),
                    close,
                    101.0,
                    99.0,
                    close,
                    1000.0,
                );
                c.ema20 = Some(100.0);
                c.ema50 = Some(100.0);
                c.ema200 = Some(100.0);
                c.rsi14 = rsi;
                c
            })
            .collect()
    }

    #[test]
    fn oversold_at_support_is_a_buy() {
        let candles = range_series(99.5, Some(30.0));
        let strategy = RangeReversion;
        match strategy.propose(&candles, "BTC/USDT", "1h", MarketRegime::Range) {
            Evaluation::Proposal(sig) => {
                assert_eq!(sig.action, TradeAction::Buy);
                assert_eq!(sig.risk_rating, RiskRating::Medium);
                assert!((sig.confidence_score - 0.6).abs() < f64::EPSILON);
                // Stop below the range floor, target above the entry.
                assert!((sig.stop_loss.unwrap() - 99.0 * 0.99).abs() < f64::EPSILON);
                assert!((sig.take_profits.unwrap()[0] - 99.5 * 1.03).abs() < f64::EPSILON);
            }
            other => panic!("expected proposal, got {other:?}"),
        }
    }

    #[test]
    fn overbought_at_resistance_is_a_sell() {
        let candles = range_series(100.8, Some(70.0));
        let strategy = RangeReversion;
        match strategy.propose(&candles, "BTC/USDT", "1h", MarketRegime::Range) {
            Evaluation::Proposal(sig) => {
                assert_eq!(sig.action, TradeAction::Sell);
                assert_eq!(sig.risk_rating, RiskRating::High);
                assert!((sig.stop_loss.unwrap() - 101.0 * 1.01).abs() < f64::EPSILON);
                assert!((sig.take_profits.unwrap()[0] - 100.8 * 0.97).abs() < f64::EPSILON);
            }
            other => panic!("expected proposal, got {other:?}"),
        }
    }

    #[test]
    fn neutral_momentum_abstains() {
        // At support but the oscillator reads neutral: no setup.
        let candles = range_series(99.5, Some(50.0));
        let strategy = RangeReversion;
        assert!(matches!(
            strategy.propose(&candles, "BTC/USDT", "1h", MarketRegime::Range),
            Evaluation::Abstain
        ));
    }

    #[test]
    fn mid_range_abstains_even_when_oversold() {
        let candles = range_series(100.0, Some(30.0));
        let strategy = RangeReversion;
        assert!(matches!(
            strategy.propose(&candles, "BTC/USDT", "1h", MarketRegime::Range),
            Evaluation::Abstain
        ));
    }

    #[test]
    fn wide_range_abstains() {
        // Span 20% of the mean close: too wide to fade.
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let mut c = Candle::new(
                    start + Duration::minutes(5 * i as i64),
                    100.0,
                    110.0,
                    90.0,
                    if i == 59 { 90.5 } else { 100.0 },
                    1000.0,
                );
                c.rsi14 = Some(30.0);
                c
            })
            .collect();
        let strategy = RangeReversion;
        assert!(matches!(
            strategy.propose(&candles, "BTC/USDT", "1h", MarketRegime::Range),
            Evaluation::Abstain
        ));
    }

    #[test]
    fn wrong_regime_abstains() {
        let candles = range_series(99.5, Some(30.0));
        let strategy = RangeReversion;
        for regime in [
            MarketRegime::TrendUp,
            MarketRegime::Choppy,
            MarketRegime::Unknown,
        ] {
            assert!(matches!(
                strategy.propose(&candles, "BTC/USDT", "1h", regime),
                Evaluation::Abstain
            ));
        }
    }

    #[test]
    fn missing_oscillator_faults() {
        let candles = range_series(99.5, None);
        let strategy = RangeReversion;
        assert!(matches!(
            strategy.propose(&candles, "BTC/USDT", "1h", MarketRegime::Range),
            Evaluation::Fault(_)
        ));
    }

    #[test]
    fn empty_window_faults() {
        let strategy = RangeReversion;
        assert!(matches!(
            strategy.propose(&[], "BTC/USDT", "1h", MarketRegime::Range),
            Evaluation::Fault(_)
        ));
    }
}
