//! Indicator annotation pipeline.
//!
//! Raw candles are enriched in one pass: trend averages, momentum oscillator,
//! MACD family and volatility bands, then candles still missing a required
//! field are dropped so downstream consumers never see a partial row.
//!
//! EMAs seed from the first close and are valid from bar 0; the oscillator
//! and the bands keep a real warmup, so `drop_incomplete` trims a leading
//! stub of every series.

use super::candle::Candle;

/// EMA with alpha = 2/(period+1), seeded from the first value.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = values[0];
    out.push(current);
    for &v in &values[1..] {
        current = v * k + current * (1.0 - k);
        out.push(current);
    }
    out
}

/// Wilder RSI: simple-average seed over the first `period` deltas, then
/// smoothed averages. `None` until the seed window is full.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss += -delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in (period + 1)..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { -delta } else { 0.0 };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    if avg_gain == 0.0 {
        return 0.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// MACD line (fast EMA − slow EMA), signal line, histogram.
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal);
    let hist: Vec<f64> = line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();
    (line, signal_line, hist)
}

/// Bollinger bands: SMA(period) ± k sample standard deviations, with width.
/// `None` while the window is filling.
pub fn bollinger(closes: &[f64], period: usize, k: f64) -> Vec<Option<(f64, f64, f64, f64)>> {
    let mut out = vec![None; closes.len()];
    if period < 2 {
        return out;
    }
    for i in (period - 1)..closes.len() {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period as f64 - 1.0);
        let std = var.sqrt();
        let upper = mean + k * std;
        let lower = mean - k * std;
        out[i] = Some((upper, mean, lower, upper - lower));
    }
    out
}

/// Average true range: simple mean of the last `period` true ranges.
/// The first bar's true range is its high−low span. `None` when the series
/// is shorter than the period.
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let mut trs = Vec::with_capacity(candles.len());
    for (i, c) in candles.iter().enumerate() {
        let tr = if i == 0 {
            c.high - c.low
        } else {
            c.true_range(candles[i - 1].close)
        };
        trs.push(tr);
    }
    let tail = &trs[trs.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

/// Fill every derived field on a fresh copy of the series.
pub fn annotate(candles: &[Candle]) -> Vec<Candle> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema20 = ema(&closes, 20);
    let ema50 = ema(&closes, 50);
    let ema200 = ema(&closes, 200);
    let rsi14 = rsi(&closes, 14);
    let (macd_line, macd_signal, macd_hist) = macd(&closes, 12, 26, 9);
    let bands = bollinger(&closes, 20, 2.0);

    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut out = c.clone();
            out.ema20 = ema20.get(i).copied();
            out.ema50 = ema50.get(i).copied();
            out.ema200 = ema200.get(i).copied();
            out.rsi14 = rsi14[i];
            out.macd = macd_line.get(i).copied();
            out.macd_signal = macd_signal.get(i).copied();
            out.macd_hist = macd_hist.get(i).copied();
            if let Some((upper, mid, lower, width)) = bands[i] {
                out.bb_upper = Some(upper);
                out.bb_mid = Some(mid);
                out.bb_lower = Some(lower);
                out.bb_width = Some(width);
            }
            out
        })
        .collect()
}

/// Drop candles still missing a field the classifier or strategies require.
/// Band and MACD fields stay optional context and are not checked.
pub fn drop_incomplete(candles: Vec<Candle>) -> Vec<Candle> {
    candles
        .into_iter()
        .filter(|c| {
            c.ema20.is_some() && c.ema50.is_some() && c.ema200.is_some() && c.rsi14.is_some()
        })
        .collect()
}
