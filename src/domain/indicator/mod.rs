//! Technical indicator engine.
//!
//! [`compute`] turns a validated [`BarSeries`] into an [`IndicatorFrame`]: one
//! [`IndicatorRow`] per bar, carrying the raw OHLCV fields plus every derived
//! value the regime classifier and instrument evaluator read. A derived value
//! is `None` until its window has enough history; values at index `t` are
//! computed from bars `0..=t` only.

pub mod ema;
pub mod kdj;
pub mod macd;
pub mod sma;

use crate::domain::error::SignalError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use chrono::NaiveDate;

pub const MA_PERIOD: usize = 20;
pub const VOLUME_MA_PERIOD: usize = 5;
pub const SLOPE_LAG: usize = 5;
pub const RETURN_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ma20: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub vol_ma5: Option<f64>,
    pub ma20_slope: Option<f64>,
    pub kdj_k: Option<f64>,
}

impl IndicatorRow {
    /// MACD line strictly above its signal line.
    pub fn macd_above_signal(&self) -> bool {
        gt(self.macd, self.signal)
    }

    /// MACD line strictly below its signal line.
    pub fn macd_below_signal(&self) -> bool {
        lt(self.macd, self.signal)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub code: String,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `back` sessions before the latest one (`0` is the latest).
    pub fn back(&self, back: usize) -> Option<&IndicatorRow> {
        let idx = self.rows.len().checked_sub(back + 1)?;
        self.rows.get(idx)
    }

    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.back(0)
    }

    /// Percent change of close over the trailing `window` sessions:
    /// `(close[t] / close[t-window] - 1) * 100`.
    pub fn trailing_return(&self, window: usize) -> Option<f64> {
        let curr = self.back(0)?;
        let base = self.back(window)?;
        Some((curr.close / base.close - 1.0) * 100.0)
    }
}

pub fn compute(series: &BarSeries) -> IndicatorFrame {
    let bars = series.bars();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let ma20 = sma::calculate_sma(&closes, MA_PERIOD);
    let ma20_slope = sma::calculate_change(&ma20, SLOPE_LAG);
    let vol_ma5 = sma::calculate_sma(&volumes, VOLUME_MA_PERIOD);
    let macd = macd::calculate_macd_default(&closes);
    let kdj_k = kdj::calculate_kdj_k_default(bars);

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ma20: ma20[i],
            ema12: macd.ema_fast[i],
            ema26: macd.ema_slow[i],
            macd: macd.line[i],
            signal: macd.signal[i],
            vol_ma5: vol_ma5[i],
            ma20_slope: ma20_slope[i],
            kdj_k: kdj_k[i],
        })
        .collect();

    IndicatorFrame {
        code: series.code().to_string(),
        rows,
    }
}

/// Validates raw bars and computes the frame in one step.
pub fn compute_bars(code: &str, bars: Vec<OhlcvBar>) -> Result<IndicatorFrame, SignalError> {
    let series = BarSeries::new(code, bars)?;
    Ok(compute(&series))
}

/// `a > b`, false when either side is undefined.
pub fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

/// `a < b`, false when either side is undefined.
pub fn lt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

/// `a >= b`, false when either side is undefined.
pub fn ge(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a >= b)
}

/// `a <= b`, false when either side is undefined.
pub fn le(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a <= b)
}
