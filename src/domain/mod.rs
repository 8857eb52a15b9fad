//! Core domain types and logic.

pub mod candle;
pub mod indicators;
pub mod regime;
pub mod signal;
pub mod strategy;
pub mod engine;
pub mod backtest;
pub mod risk;
pub mod error;
