//! CLI definition and dispatch.
//!
//! Results go to stdout as JSON; progress and errors go to stderr. Flags
//! override config file values, which override built-in defaults.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvCandleAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::run_backtest;
use crate::domain::engine::SignalEngine;
use crate::domain::error::ChartistError;
use crate::domain::regime::MarketRegime;
use crate::domain::risk::position_sizing;
use crate::domain::signal::TradeSignal;
use crate::domain::strategy::StrategyRegistry;
use crate::ports::candle_port::CandlePort;
use crate::ports::config_port::ConfigPort;

const DEFAULT_LIMIT: usize = 300;
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "chartist", about = "Market regime signal generator and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a trade signal for a symbol
    Signal {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        timeframe: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// Use synthetic demo data instead of the data directory
        #[arg(long)]
        demo: bool,
        /// Comma-separated strategy allow-list
        #[arg(long, value_delimiter = ',')]
        strategies: Option<Vec<String>>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Replay a single strategy over historical candles
    Backtest {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        timeframe: Option<String>,
        #[arg(long)]
        strategy: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List registered strategies and their regimes
    Strategies,
    /// Size a position from account risk
    Size {
        #[arg(long)]
        account: f64,
        #[arg(long)]
        risk_pct: f64,
        #[arg(long)]
        entry: f64,
        #[arg(long)]
        stop: f64,
        #[arg(long, value_delimiter = ',')]
        take_profits: Option<Vec<f64>>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signal {
            symbol,
            timeframe,
            limit,
            demo,
            strategies,
            config,
            data_dir,
        } => run_signal(
            symbol,
            timeframe,
            limit,
            demo,
            strategies,
            config.as_ref(),
            data_dir,
        ),
        Command::Backtest {
            symbol,
            timeframe,
            strategy,
            limit,
            config,
            data_dir,
        } => run_backtest_command(symbol, timeframe, &strategy, limit, config.as_ref(), data_dir),
        Command::Strategies => run_strategies(),
        Command::Size {
            account,
            risk_pct,
            entry,
            stop,
            take_profits,
        } => run_size(account, risk_pct, entry, stop, take_profits),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolved inputs shared by the signal and backtest commands.
#[derive(Debug)]
pub struct DataParams {
    pub symbol: String,
    pub timeframe: String,
    pub limit: usize,
    pub data_dir: PathBuf,
}

/// Flags override config values, which override built-in defaults.
pub fn resolve_data_params(
    symbol: Option<String>,
    timeframe: Option<String>,
    limit: Option<usize>,
    data_dir: Option<PathBuf>,
    config: Option<&FileConfigAdapter>,
) -> Result<DataParams, ChartistError> {
    let require = |flag: Option<String>, key: &str| -> Result<String, ChartistError> {
        flag.or_else(|| config.and_then(|c| c.get_string("signal", key)))
            .ok_or_else(|| ChartistError::ConfigMissing {
                section: "signal".to_string(),
                key: key.to_string(),
            })
    };
    let symbol = require(symbol, "symbol")?;
    let timeframe = require(timeframe, "timeframe")?;
    let limit = limit.unwrap_or_else(|| {
        config.map_or(DEFAULT_LIMIT, |c| {
            c.get_int("signal", "limit", DEFAULT_LIMIT as i64) as usize
        })
    });
    let data_dir = data_dir
        .or_else(|| config.and_then(|c| c.get_string("data", "dir")).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    Ok(DataParams {
        symbol,
        timeframe,
        limit,
        data_dir,
    })
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_signal(
    symbol: Option<String>,
    timeframe: Option<String>,
    limit: Option<usize>,
    demo: bool,
    strategies: Option<Vec<String>>,
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
) -> ExitCode {
    let config = match config_path.map(load_config).transpose() {
        Ok(c) => c,
        Err(code) => return code,
    };
    let demo = demo
        || config
            .as_ref()
            .is_some_and(|c| c.get_bool("signal", "demo", false));

    let params = match resolve_data_params(symbol, timeframe, limit, data_dir, config.as_ref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let engine = SignalEngine::new(Box::new(CsvCandleAdapter::new(params.data_dir)));
    match engine.generate(
        &params.symbol,
        &params.timeframe,
        params.limit,
        demo,
        strategies.as_deref(),
    ) {
        Ok(Some(signal)) => print_json(&signal),
        Ok(None) => print_json(&TradeSignal::no_trade(&params.symbol, &params.timeframe)),
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_backtest_command(
    symbol: Option<String>,
    timeframe: Option<String>,
    strategy_name: &str,
    limit: Option<usize>,
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
) -> ExitCode {
    let config = match config_path.map(load_config).transpose() {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = match resolve_data_params(symbol, timeframe, limit, data_dir, config.as_ref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let registry = StrategyRegistry::with_default_strategies();
    let strategy = match registry.by_name(strategy_name) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let adapter = CsvCandleAdapter::new(params.data_dir);
    let result = adapter
        .fetch_candles(&params.symbol, &params.timeframe, params.limit)
        .and_then(|candles| {
            run_backtest(
                &candles,
                strategy.as_ref(),
                &params.symbol,
                &params.timeframe,
            )
        });
    match result {
        Ok(result) => print_json(&result),
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[derive(Serialize)]
struct StrategyInfo {
    name: &'static str,
    description: &'static str,
    regimes: Vec<MarketRegime>,
}

fn run_strategies() -> ExitCode {
    let registry = StrategyRegistry::with_default_strategies();
    let listing: Vec<StrategyInfo> = registry
        .all()
        .iter()
        .map(|s| StrategyInfo {
            name: s.name(),
            description: s.description(),
            regimes: s.regimes().to_vec(),
        })
        .collect();
    print_json(&listing)
}

fn run_size(
    account: f64,
    risk_pct: f64,
    entry: f64,
    stop: f64,
    take_profits: Option<Vec<f64>>,
) -> ExitCode {
    match position_sizing(
        account,
        risk_pct,
        entry,
        stop,
        take_profits.as_deref().unwrap_or(&[]),
    ) {
        Ok(sizing) => print_json(&sizing),
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
