//! Trend-continuation strategy: buy pullbacks in a confirmed uptrend.

use std::collections::BTreeMap;

use super::{Evaluation, Strategy};
use crate::domain::candle::Candle;
use crate::domain::indicators::atr;
use crate::domain::regime::MarketRegime;
use crate::domain::signal::{RiskRating, TradeAction, TradeSignal};

const SHORT_SLOPE_LOOKBACK: usize = 8;
const MEDIUM_SLOPE_LOOKBACK: usize = 13;
const ATR_WINDOW: usize = 80;
const ATR_PERIOD: usize = 14;
const SWING_LOOKBACK: usize = 20;

pub struct TrendContinuation;

/// Slope over the last `lookback` values: `(end - start) / start`.
/// Series shorter than the lookback read as flat, so thin histories fail
/// the momentum gate and the strategy abstains instead of faulting.
fn tail_slope(values: &[f64], lookback: usize) -> f64 {
    if values.len() < lookback {
        return 0.0;
    }
    let start = values[values.len() - lookback];
    let end = values[values.len() - 1];
    (end - start) / start.max(1e-9)
}

impl Strategy for TrendContinuation {
    fn name(&self) -> &'static str {
        "TrendContinuation"
    }

    fn description(&self) -> &'static str {
        "Buys pullbacks toward the short trend average in a confirmed uptrend"
    }

    fn regimes(&self) -> &'static [MarketRegime] {
        &[
            MarketRegime::TrendUp,
            MarketRegime::TrendDown,
            MarketRegime::Breakout,
        ]
    }

    fn propose(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: &str,
        regime: MarketRegime,
    ) -> Evaluation {
        // Long-only: anything but a confirmed uptrend is out of scope.
        if regime != MarketRegime::TrendUp {
            return Evaluation::Abstain;
        }
        let last = match candles.last() {
            Some(c) => c,
            None => return Evaluation::Fault("empty candle window".to_string()),
        };

        let close = last.close;
        // Secondary fields fall back to neutral stand-ins so a sparse window
        // degrades to abstention instead of failure.
        let ema20 = last.ema20.unwrap_or(close);
        let ema50 = last.ema50.unwrap_or(close * 0.99);
        let ema200 = last.ema200.unwrap_or(ema50 * 0.99);
        let rsi = last.rsi14.unwrap_or(55.0);

        let ema20_series: Vec<f64> = candles.iter().filter_map(|c| c.ema20).collect();
        let ema50_series: Vec<f64> = candles.iter().filter_map(|c| c.ema50).collect();
        let ema20_slope = tail_slope(&ema20_series, SHORT_SLOPE_LOOKBACK);
        let ema50_slope = tail_slope(&ema50_series, MEDIUM_SLOPE_LOOKBACK);

        let ema_trend_ok = ema20 > ema50 && ema50 > ema200 && ema20_slope > 0.0005;
        if !ema_trend_ok {
            return Evaluation::Abstain;
        }

        // Price must sit in the pullback band around the short average.
        let band_low = ema20.min(ema50) * 0.985;
        let band_high = ema20 * 1.03;
        if close < band_low || close > band_high {
            return Evaluation::Abstain;
        }

        // Healthy momentum only: not washed out, not already overheated.
        if !(50.0..=68.0).contains(&rsi) {
            return Evaluation::Abstain;
        }

        let atr_window = if candles.len() > ATR_WINDOW {
            &candles[candles.len() - ATR_WINDOW..]
        } else {
            candles
        };
        let atr14 = atr(atr_window, ATR_PERIOD);

        let swing_window = if candles.len() > SWING_LOOKBACK {
            &candles[candles.len() - SWING_LOOKBACK..]
        } else {
            candles
        };
        let swing_low = swing_window
            .iter()
            .map(|c| c.low)
            .fold(f64::INFINITY, f64::min);

        let sl_buffer = match atr14 {
            Some(a) if a > 0.0 => a * 0.8,
            _ => swing_low * 0.003,
        };
        let stop_loss = (swing_low - sl_buffer).min(close * 0.97);
        let tp1 = close + atr14.map_or(close * 0.02, |a| a * 1.4);
        let tp2 = close + atr14.map_or(close * 0.04, |a| a * 2.4);

        let mut context = BTreeMap::new();
        context.insert("close".to_string(), close);
        context.insert("ema20".to_string(), ema20);
        context.insert("ema50".to_string(), ema50);
        context.insert("ema200".to_string(), ema200);
        context.insert("rsi14".to_string(), rsi);
        context.insert("ema20_slope".to_string(), ema20_slope);
        context.insert("ema50_slope".to_string(), ema50_slope);
        context.insert("atr14".to_string(), atr14.unwrap_or(0.0));

        Evaluation::Proposal(TradeSignal {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            action: TradeAction::Buy,
            strategy_name: self.name().to_string(),
            entry_zone: Some((band_low, band_high.max(ema50 * 1.01))),
            stop_loss: Some(stop_loss),
            take_profits: Some(vec![tp1, tp2]),
            risk_rating: RiskRating::Medium,
            confidence_score: (0.65 + ema20_slope * 8.0).min(0.9),
            regime,
            context,
        })
    }
}
