//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//!
//! Default parameters: fast=12, slow=26, signal=9. Both EMAs seed on the
//! first close, so every line is defined from the first bar.

use crate::domain::indicator::ema::{calculate_ema, calculate_ema_span, span_alpha};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdLines {
    let ema_fast = calculate_ema_span(closes, fast);
    let ema_slow = calculate_ema_span(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal = calculate_ema(&line, span_alpha(signal_span));

    MacdLines {
        ema_fast,
        ema_slow,
        line,
        signal,
    }
}

pub fn calculate_macd_default(closes: &[f64]) -> MacdLines {
    calculate_macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
