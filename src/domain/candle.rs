//! OHLCV candle representation.
//!
//! Candles arrive raw from a [`CandlePort`](crate::ports::candle_port::CandlePort)
//! and are annotated with derived indicator fields by
//! [`indicators::annotate`](crate::domain::indicators::annotate). Derived
//! fields are optional: absent until annotation, and possibly absent during
//! an indicator's warmup.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    // Trend averages (short / medium / long).
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,

    // Momentum oscillator.
    pub rsi14: Option<f64>,

    // MACD family.
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,

    // Volatility bands.
    pub bb_upper: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_width: Option<f64>,
}

impl Candle {
    /// A raw candle with no derived fields populated.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            ema20: None,
            ema50: None,
            ema200: None,
            rsi14: None,
            macd: None,
            macd_signal: None,
            macd_hist: None,
            bb_upper: None,
            bb_mid: None,
            bb_lower: None,
            bb_width: None,
        }
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            100.0,
            110.0,
            90.0,
            105.0,
            50_000.0,
        )
    }

    #[test]
    fn new_candle_has_no_derived_fields() {
        let c = sample_candle();
        assert!(c.ema20.is_none());
        assert!(c.ema200.is_none());
        assert!(c.rsi14.is_none());
        assert!(c.bb_upper.is_none());
    }

    #[test]
    fn true_range_hl_dominates() {
        let c = sample_candle();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((c.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let c = sample_candle();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((c.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let c = sample_candle();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((c.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }
}
