//! Market regime classification.
//!
//! The regime is derived state: recomputed from the trailing candle window on
//! every call, never persisted as authoritative. Trend regimes require
//! momentum evidence (slope), range requires quiescence evidence (price
//! compression), and ties resolve to `Choppy`. `Unknown` is reserved for
//! windows on which classification cannot run at all.

use std::fmt;

use serde::Serialize;

use super::candle::Candle;

/// Trailing window inspected by the classifier.
const CLASSIFY_WINDOW: usize = 120;
/// Sub-windows for the short/medium trend-average slopes.
const SHORT_SLOPE_WINDOW: usize = 25;
const MEDIUM_SLOPE_WINDOW: usize = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    TrendUp,
    TrendDown,
    Range,
    Choppy,
    Breakout,
    Unknown,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketRegime::TrendUp => "TREND_UP",
            MarketRegime::TrendDown => "TREND_DOWN",
            MarketRegime::Range => "RANGE",
            MarketRegime::Choppy => "CHOPPY",
            MarketRegime::Breakout => "BREAKOUT",
            MarketRegime::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Percentage slope of a derived-field series over its trailing `window`
/// values: `(end - start) / start`.
///
/// Defaults to 0 when fewer than two values exist or the start value is 0,
/// so short histories read as flat instead of failing.
pub fn pct_slope<F>(candles: &[Candle], field: F, window: usize) -> f64
where
    F: Fn(&Candle) -> Option<f64>,
{
    let values: Vec<f64> = candles.iter().filter_map(&field).collect();
    let tail = if values.len() > window {
        &values[values.len() - window..]
    } else {
        &values[..]
    };
    if tail.len() < 2 {
        return 0.0;
    }
    let start = tail[0];
    let end = tail[tail.len() - 1];
    if start == 0.0 {
        return 0.0;
    }
    (end - start) / start
}

/// Classify the current regime from the trailing candle window.
///
/// Requires the short/medium trend averages on the latest candle; without
/// them classification cannot run and the result is `Unknown`. The long
/// average falls back to the medium one when absent.
pub fn classify(candles: &[Candle]) -> MarketRegime {
    let recent = if candles.len() > CLASSIFY_WINDOW {
        &candles[candles.len() - CLASSIFY_WINDOW..]
    } else {
        candles
    };

    let last = match recent.last() {
        Some(c) => c,
        None => return MarketRegime::Unknown,
    };
    let (ema20, ema50) = match (last.ema20, last.ema50) {
        (Some(short), Some(medium)) => (short, medium),
        _ => return MarketRegime::Unknown,
    };
    let ema200 = last.ema200.unwrap_or(ema50);
    let close = last.close;

    let ema20_slope = pct_slope(recent, |c| c.ema20, SHORT_SLOPE_WINDOW);
    let ema50_slope = pct_slope(recent, |c| c.ema50, MEDIUM_SLOPE_WINDOW);

    let stacked_up = ema20 > ema50 && ema50 > ema200;
    let stacked_down = ema20 < ema50 && ema50 < ema200;

    // Require directional slope so noisy periods don't count as trends.
    if stacked_up && ema20_slope > 0.0015 && ema50_slope > 0.0005 && close > ema20 {
        return MarketRegime::TrendUp;
    }
    if stacked_down && ema20_slope < -0.0015 && ema50_slope < -0.0005 && close < ema20 {
        return MarketRegime::TrendDown;
    }

    // Range detection: small slopes + compressed prices around the medium average.
    let closes: Vec<f64> = recent.iter().map(|c| c.close).collect();
    let range_closes = if closes.len() > 60 {
        &closes[closes.len() - 60..]
    } else {
        &closes[..]
    };
    if range_closes.len() >= 20 {
        let max = range_closes.iter().cloned().fold(f64::MIN, f64::max);
        let min = range_closes.iter().cloned().fold(f64::MAX, f64::min);
        let mean = range_closes.iter().sum::<f64>() / range_closes.len() as f64;
        let pct_range = (max - min) / mean.max(1e-9);
        let close_to_ema = (close - ema50).abs() / ema50.max(1e-9);
        if ema20_slope.abs() < 0.001
            && ema50_slope.abs() < 0.0008
            && pct_range < 0.05
            && close_to_ema < 0.02
        {
            return MarketRegime::Range;
        }
    }

    MarketRegime::Choppy
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityRegime {
    Low,
    Medium,
    High,
    Unknown,
}

/// Classify volatility from the width of the bands relative to price.
pub fn volatility_regime(candle: &Candle) -> VolatilityRegime {
    let width = candle.bb_width.unwrap_or(0.0);
    if candle.close == 0.0 {
        return VolatilityRegime::Unknown;
    }
    let rel_width = width / candle.close;
    if rel_width < 0.02 {
        VolatilityRegime::Low
    } else if rel_width < 0.05 {
        VolatilityRegime::Medium
    } else {
        VolatilityRegime::High
    }
}
