//! Market data access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::ChartistError;

pub trait CandlePort {
    /// Fetch up to `limit` of the most recent candles for a symbol and
    /// timeframe, in ascending timestamp order, without derived fields.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ChartistError>;
}
