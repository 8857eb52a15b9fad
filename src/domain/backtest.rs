//! Historical replay of a single strategy.
//!
//! Walks the candle series bar by bar, re-deriving the regime from the
//! history prefix at each step so the strategy never sees the future. At most
//! one position is open at a time; exits are checked against the bar's range
//! with stop-loss taking priority over take-profit, and an opposing proposal
//! closing at the bar's close. A bar that closes a position can open the next
//! one: the entry check runs whenever the book is flat, including right after
//! an exit, so an opposing proposal both closes the old position and opens
//! the reversed one on the same bar. Any position still open after the last
//! bar is closed at the final close.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::candle::Candle;
use super::error::ChartistError;
use super::indicators::{annotate, drop_incomplete};
use super::regime::classify;
use super::signal::TradeAction;
use super::strategy::{Evaluation, Strategy};

/// Open position during replay. A missing stop or target simply never
/// triggers; such a position holds until an opposing proposal or the forced
/// final close.
#[derive(Debug, Clone)]
pub struct Position {
    pub action: TradeAction,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub timeframe: String,
    pub strategy_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub trades_count: usize,
    pub win_rate_pct: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    /// Gross profit / gross loss; +inf when there were profits but no
    /// losses, 0 when there were no profits at all.
    pub profit_factor: f64,
}

pub fn run_backtest(
    candles: &[Candle],
    strategy: &dyn Strategy,
    symbol: &str,
    timeframe: &str,
) -> Result<BacktestResult, ChartistError> {
    let candles = drop_incomplete(annotate(candles));
    if candles.is_empty() {
        return Err(ChartistError::DataUnavailable {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
        });
    }

    let mut open: Option<Position> = None;
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_drawdown = 0.0_f64;
    let mut trades = 0_usize;
    let mut wins = 0_usize;
    let mut gross_profit = 0.0_f64;
    let mut gross_loss = 0.0_f64;

    let mut record_close = |position: &Position, exit_price: f64| {
        let direction = match position.action {
            TradeAction::Sell => -1.0,
            _ => 1.0,
        };
        let ret = (exit_price - position.entry_price) / position.entry_price * direction;
        equity *= 1.0 + ret;
        trades += 1;
        if ret > 0.0 {
            wins += 1;
            gross_profit += ret;
        } else {
            gross_loss += -ret;
        }
        if equity > peak {
            peak = equity;
        }
        let drawdown = (peak - equity) / peak;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    };

    for i in 0..candles.len() {
        let history = &candles[..=i];
        let bar = &candles[i];
        let regime = classify(history);

        let proposal = match strategy.propose(history, symbol, timeframe, regime) {
            Evaluation::Proposal(signal) => Some(signal),
            Evaluation::Abstain => None,
            Evaluation::Fault(reason) => {
                warn!(
                    strategy = strategy.name(),
                    %reason,
                    timestamp = %bar.timestamp,
                    "strategy fault during replay, treating as abstention"
                );
                None
            }
        };

        if let Some(position) = open.take() {
            let exit_price = match position.action {
                TradeAction::Sell => {
                    if position.stop_loss.is_some_and(|sl| bar.high >= sl) {
                        position.stop_loss
                    } else if position.take_profit.is_some_and(|tp| bar.low <= tp) {
                        position.take_profit
                    } else if matches!(
                        proposal.as_ref().map(|s| s.action),
                        Some(TradeAction::Buy)
                    ) {
                        Some(bar.close)
                    } else {
                        None
                    }
                }
                _ => {
                    if position.stop_loss.is_some_and(|sl| bar.low <= sl) {
                        position.stop_loss
                    } else if position.take_profit.is_some_and(|tp| bar.high >= tp) {
                        position.take_profit
                    } else if matches!(
                        proposal.as_ref().map(|s| s.action),
                        Some(TradeAction::Sell)
                    ) {
                        Some(bar.close)
                    } else {
                        None
                    }
                }
            };
            match exit_price {
                Some(price) => record_close(&position, price),
                None => open = Some(position),
            }
        }

        // Entry runs whenever the book is flat, including on the bar that
        // just closed a position: an opposing proposal reverses in one bar.
        if open.is_none() {
            if let Some(signal) = proposal {
                if matches!(signal.action, TradeAction::Buy | TradeAction::Sell) {
                    open = Some(Position {
                        action: signal.action,
                        entry_price: bar.close,
                        stop_loss: signal.stop_loss,
                        take_profit: signal
                            .take_profits
                            .as_ref()
                            .and_then(|tps| tps.first().copied()),
                        opened_at: bar.timestamp,
                    });
                }
            }
        }
    }

    // Anything still open is marked to the final close.
    if let Some(position) = open {
        let last_close = candles[candles.len() - 1].close;
        record_close(&position, last_close);
    }

    let win_rate_pct = if trades > 0 {
        wins as f64 / trades as f64 * 100.0
    } else {
        0.0
    };
    let profit_factor = if gross_profit > 0.0 && gross_loss == 0.0 {
        f64::INFINITY
    } else if gross_profit == 0.0 {
        0.0
    } else {
        gross_profit / gross_loss
    };

    Ok(BacktestResult {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        strategy_name: strategy.name().to_string(),
        start: candles[0].timestamp,
        end: candles[candles.len() - 1].timestamp,
        trades_count: trades,
        win_rate_pct,
        total_return_pct: (equity - 1.0) * 100.0,
        max_drawdown_pct: max_drawdown * 100.0,
        profit_factor,
    })
}
