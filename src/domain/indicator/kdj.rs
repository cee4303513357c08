//! KDJ stochastic oscillator, fast line K only.
//!
//! RSV[i] = (C[i] - min(L, n)) / (max(H, n) - min(L, n)) * 100
//! K = EMA of RSV with center of mass 2 (a = 1/3).
//!
//! A window whose high equals its low has no range: RSV is undefined there,
//! and so is K for that bar.

use crate::domain::indicator::ema::{calculate_ema, com_alpha};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 9;
pub const DEFAULT_COM: f64 = 2.0;

pub fn calculate_rsv(bars: &[OhlcvBar], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; bars.len()];
    }

    (0..bars.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range == 0.0 {
                None
            } else {
                Some((bars[i].close - lowest) / range * 100.0)
            }
        })
        .collect()
}

pub fn calculate_kdj_k(bars: &[OhlcvBar], period: usize, com: f64) -> Vec<Option<f64>> {
    calculate_ema(&calculate_rsv(bars, period), com_alpha(com))
}

pub fn calculate_kdj_k_default(bars: &[OhlcvBar]) -> Vec<Option<f64>> {
    calculate_kdj_k(bars, DEFAULT_PERIOD, DEFAULT_COM)
}
