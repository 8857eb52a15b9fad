//! CLI parameter resolution and the file-backed data path.

use chartist::adapters::csv_adapter::CsvCandleAdapter;
use chartist::adapters::file_config_adapter::FileConfigAdapter;
use chartist::cli::resolve_data_params;
use chartist::domain::engine::SignalEngine;
use chartist::domain::error::ChartistError;
use chartist::domain::signal::TradeAction;
use chartist::ports::candle_port::CandlePort;
use std::fmt::Write as _;
use std::path::PathBuf;

const VALID_INI: &str = r#"
[data]
dir = /var/lib/chartist/candles

[signal]
symbol = BTC/USDT
timeframe = 1h
limit = 250
demo = false
"#;

mod parameter_resolution {
    use super::*;

    #[test]
    fn flags_override_config_values() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let params = resolve_data_params(
            Some("ETH/USDT".to_string()),
            Some("5m".to_string()),
            Some(100),
            Some(PathBuf::from("/tmp/candles")),
            Some(&config),
        )
        .unwrap();

        assert_eq!(params.symbol, "ETH/USDT");
        assert_eq!(params.timeframe, "5m");
        assert_eq!(params.limit, 100);
        assert_eq!(params.data_dir, PathBuf::from("/tmp/candles"));
    }

    #[test]
    fn config_fills_in_missing_flags() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let params = resolve_data_params(None, None, None, None, Some(&config)).unwrap();

        assert_eq!(params.symbol, "BTC/USDT");
        assert_eq!(params.timeframe, "1h");
        assert_eq!(params.limit, 250);
        assert_eq!(params.data_dir, PathBuf::from("/var/lib/chartist/candles"));
    }

    #[test]
    fn defaults_apply_without_any_config() {
        let params = resolve_data_params(
            Some("BTC/USDT".to_string()),
            Some("1h".to_string()),
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(params.limit, 300);
        assert_eq!(params.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn missing_symbol_is_a_config_error() {
        let config = FileConfigAdapter::from_string("[signal]\ntimeframe = 1h\n").unwrap();
        let err = resolve_data_params(None, None, None, None, Some(&config)).unwrap_err();
        assert!(matches!(
            err,
            ChartistError::ConfigMissing { ref section, ref key }
                if section == "signal" && key == "symbol"
        ));
    }
}

mod csv_backed_pipeline {
    use super::*;

    /// Write a pullback uptrend as a CSV candle file and run the whole
    /// signal pipeline against it.
    #[test]
    fn signal_from_csv_data_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut content = String::from("timestamp,open,high,low,close,volume\n");
        let mut close = 100.0;
        for i in 0..200usize {
            if i > 0 {
                close += if i % 2 == 1 { 0.3 } else { -0.2 };
            }
            let ts = 1_704_067_200 + 300 * i as i64;
            writeln!(
                content,
                "{},{:.4},{:.4},{:.4},{:.4},1000",
                ts,
                close,
                close * 1.005,
                close * 0.995,
                close
            )
            .unwrap();
        }
        std::fs::write(dir.path().join("BTC-USDT_5m.csv"), content).unwrap();

        let adapter = CsvCandleAdapter::new(dir.path().to_path_buf());
        let fetched = adapter.fetch_candles("BTC/USDT", "5m", 500).unwrap();
        assert_eq!(fetched.len(), 200);

        let engine = SignalEngine::new(Box::new(adapter));
        let signal = engine
            .generate("BTC/USDT", "5m", 500, false, None)
            .unwrap()
            .expect("uptrend csv should produce a signal");
        assert_eq!(signal.action, TradeAction::Buy);
        assert_eq!(signal.strategy_name, "TrendContinuation");
    }

    #[test]
    fn missing_csv_file_surfaces_as_data_source_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let engine = SignalEngine::new(Box::new(CsvCandleAdapter::new(dir.path().to_path_buf())));
        let err = engine
            .generate("BTC/USDT", "5m", 100, false, None)
            .unwrap_err();
        assert!(matches!(err, ChartistError::DataSource { .. }));
    }
}
