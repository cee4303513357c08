//! Market-data provider port trait.

use crate::domain::error::SignalError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// The trailing `lookback_days` daily bars for `code`, oldest first.
    fn fetch_bars(&self, code: &str, lookback_days: usize) -> Result<Vec<OhlcvBar>, SignalError>;

    /// First date, last date and bar count available for `code`.
    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SignalError>;
}
