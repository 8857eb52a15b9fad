//! Regime-keyed strategy routing table.
//!
//! The table is built once and only read afterwards; strategies are shared
//! behind `Arc` so the same instance serves every lookup.

use std::sync::Arc;

use super::{RangeReversion, Strategy, TrendContinuation};
use crate::domain::error::ChartistError;
use crate::domain::regime::MarketRegime;

pub struct StrategyRegistry {
    entries: Vec<(MarketRegime, Vec<Arc<dyn Strategy>>)>,
}

impl StrategyRegistry {
    /// Build the default table over the built-in strategies.
    ///
    /// Trend regimes route to the trend strategy (which narrows further
    /// internally), sideways regimes to the range strategy, and an unknown
    /// regime consults both rather than silencing the engine.
    pub fn with_default_strategies() -> Self {
        let trend: Arc<dyn Strategy> = Arc::new(TrendContinuation);
        let range: Arc<dyn Strategy> = Arc::new(RangeReversion);
        StrategyRegistry {
            entries: vec![
                (MarketRegime::TrendUp, vec![trend.clone()]),
                (MarketRegime::TrendDown, vec![trend.clone()]),
                (MarketRegime::Breakout, vec![trend.clone()]),
                (MarketRegime::Range, vec![range.clone()]),
                (MarketRegime::Choppy, vec![range.clone()]),
                (MarketRegime::Unknown, vec![trend, range]),
            ],
        }
    }

    /// Strategies registered for `regime`. Unmapped regimes yield an empty
    /// list, never an error.
    pub fn for_regime(&self, regime: MarketRegime) -> Vec<Arc<dyn Strategy>> {
        self.entries
            .iter()
            .find(|(r, _)| *r == regime)
            .map(|(_, strategies)| strategies.clone())
            .unwrap_or_default()
    }

    /// Every distinct registered strategy, deduplicated by name in
    /// registration order.
    pub fn all(&self) -> Vec<Arc<dyn Strategy>> {
        let mut seen: Vec<&'static str> = Vec::new();
        let mut out: Vec<Arc<dyn Strategy>> = Vec::new();
        for (_, strategies) in &self.entries {
            for strategy in strategies {
                if !seen.contains(&strategy.name()) {
                    seen.push(strategy.name());
                    out.push(strategy.clone());
                }
            }
        }
        out
    }

    /// Look a strategy up by its exact name.
    pub fn by_name(&self, name: &str) -> Result<Arc<dyn Strategy>, ChartistError> {
        self.all()
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ChartistError::UnknownStrategy {
                name: name.to_string(),
            })
    }
}
