#![allow(dead_code)]

use chartist::domain::candle::Candle;
use chartist::domain::error::ChartistError;
use chartist::ports::candle_port::CandlePort;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;

pub struct MockCandlePort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockCandlePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl CandlePort for MockCandlePort {
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ChartistError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ChartistError::DataSource {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                reason: reason.clone(),
            });
        }
        let candles = self.data.get(symbol).cloned().unwrap_or_default();
        let n = candles.len().min(limit);
        Ok(candles[candles.len() - n..].to_vec())
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn make_candle(index: usize, close: f64) -> Candle {
    Candle::new(
        base_time() + Duration::minutes(5 * index as i64),
        close,
        close * 1.005,
        close * 0.995,
        close,
        1000.0,
    )
}

/// Gentle uptrend with small pullbacks: +0.3 then -0.2, alternating.
/// Net drift keeps the trend averages stacked and sloping while the
/// oscillator settles near 60 instead of pinning at 100.
pub fn pullback_uptrend(count: usize, start_price: f64) -> Vec<Candle> {
    let mut close = start_price;
    (0..count)
        .map(|i| {
            if i > 0 {
                close += if i % 2 == 1 { 0.3 } else { -0.2 };
            }
            make_candle(i, close)
        })
        .collect()
}

/// Flat tape oscillating a few ticks around `price`.
pub fn flat_range(count: usize, price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = price + (i % 2) as f64 * 0.1;
            make_candle(i, close)
        })
        .collect()
}
