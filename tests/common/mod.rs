#![allow(dead_code)]

use chrono::NaiveDate;
use etfscan::domain::error::SignalError;
pub use etfscan::domain::ohlcv::OhlcvBar;
use etfscan::domain::pipeline::ScanConfig;
use etfscan::domain::pool::parse_pool;
use etfscan::ports::data_port::DataPort;
use std::collections::HashMap;

pub const BENCHMARK: &str = "sh000300";

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, code: &str, lookback_days: usize) -> Result<Vec<OhlcvBar>, SignalError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(SignalError::DataSource {
                code: code.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(code).cloned().unwrap_or_default();
        let skip = bars.len().saturating_sub(lookback_days);
        Ok(bars.into_iter().skip(skip).collect())
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SignalError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(SignalError::DataSource {
                code: code.to_string(),
                reason: reason.clone(),
            });
        }
        match self.data.get(code) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars on consecutive calendar days from 2024-01-01 with
/// `close = start_price + step * i`, a fixed ±10 high/low band and volume
/// rising by 10 per session.
pub fn ramp_bars(code: &str, count: usize, start_price: f64, step: f64) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            OhlcvBar {
                code: code.to_string(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 10.0,
                low: close - 10.0,
                close,
                volume: 1000.0 + 10.0 * i as f64,
            }
        })
        .collect()
}

/// 30 sessions climbing 1.0 per day from 50: a clean BUY setup whenever the
/// benchmark permits entry.
pub fn bullish_bars(code: &str) -> Vec<OhlcvBar> {
    ramp_bars(code, 30, 50.0, 1.0)
}

/// 30 sessions falling 1.0 per day from 80: close ends under MA20.
pub fn bearish_bars(code: &str) -> Vec<OhlcvBar> {
    ramp_bars(code, 30, 80.0, -1.0)
}

/// Benchmark climbing from 1000: permitted, about +1.98% over 20 sessions.
pub fn rising_benchmark() -> Vec<OhlcvBar> {
    ramp_bars(BENCHMARK, 30, 1000.0, 1.0)
}

/// Benchmark falling from 1000: close under MA20, entry blocked.
pub fn falling_benchmark() -> Vec<OhlcvBar> {
    ramp_bars(BENCHMARK, 30, 1000.0, -1.0)
}

pub fn scan_config(pool: &str) -> ScanConfig {
    ScanConfig::new(BENCHMARK, parse_pool(pool).unwrap())
}
