//! CSV file candle adapter.
//!
//! One file per symbol/timeframe pair, named `SYMBOL_TIMEFRAME.csv` with `/`
//! in the symbol replaced by `-` (`BTC-USDT_1h.csv`). Columns:
//! `timestamp,open,high,low,close,volume` with unix-second timestamps.

use crate::domain::candle::Candle;
use crate::domain::error::ChartistError;
use crate::ports::candle_port::CandlePort;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvCandleAdapter {
    base_path: PathBuf,
}

impl CsvCandleAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        let symbol = symbol.replace('/', "-");
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

fn data_err(symbol: &str, timeframe: &str, reason: String) -> ChartistError {
    ChartistError::DataSource {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        reason,
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| format!("missing {} column", name))?
        .parse()
        .map_err(|e| format!("invalid {} value: {}", name, e))
}

impl CandlePort for CsvCandleAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ChartistError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| {
            data_err(
                symbol,
                timeframe,
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| data_err(symbol, timeframe, format!("CSV parse error: {}", e)))?;

            let secs: i64 = parse_field(&record, 0, "timestamp")
                .map_err(|r| data_err(symbol, timeframe, r))?;
            let timestamp: DateTime<Utc> = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                data_err(symbol, timeframe, format!("timestamp out of range: {}", secs))
            })?;
            let open: f64 =
                parse_field(&record, 1, "open").map_err(|r| data_err(symbol, timeframe, r))?;
            let high: f64 =
                parse_field(&record, 2, "high").map_err(|r| data_err(symbol, timeframe, r))?;
            let low: f64 =
                parse_field(&record, 3, "low").map_err(|r| data_err(symbol, timeframe, r))?;
            let close: f64 =
                parse_field(&record, 4, "close").map_err(|r| data_err(symbol, timeframe, r))?;
            let volume: f64 =
                parse_field(&record, 5, "volume").map_err(|r| data_err(symbol, timeframe, r))?;

            candles.push(Candle::new(timestamp, open, high, low, close, volume));
        }

        candles.sort_by_key(|c| c.timestamp);
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        Ok(candles)
    }
}
