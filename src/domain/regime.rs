//! Market regime classification from the benchmark index.
//!
//! Trading is permitted when the benchmark closes above its MA20 and the MA20
//! is at least as high as it was five sessions earlier. The regime also
//! carries the benchmark's 20-session trailing return, the yardstick every
//! instrument's relative strength is measured against.

use crate::domain::error::SignalError;
use crate::domain::indicator::{gt, ge, IndicatorFrame, RETURN_WINDOW, SLOPE_LAG};
use std::fmt;

pub const MIN_REGIME_BARS: usize = 25;

/// Coarse environment label with a per-instrument position cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegimeTier {
    /// Above MA20 with a sustained upward MA20.
    Aggressive,
    /// Above MA20 but the MA20 has not held its level.
    Neutral,
    /// At or below MA20.
    Risk,
}

impl RegimeTier {
    pub fn max_position(&self) -> f64 {
        match self {
            RegimeTier::Aggressive => 0.5,
            RegimeTier::Neutral => 0.3,
            RegimeTier::Risk => 0.0,
        }
    }
}

impl fmt::Display for RegimeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeTier::Aggressive => write!(f, "AGGRESSIVE"),
            RegimeTier::Neutral => write!(f, "NEUTRAL"),
            RegimeTier::Risk => write!(f, "RISK"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketRegime {
    pub benchmark: String,
    pub permitted: bool,
    pub tier: RegimeTier,
    pub trailing_return_20d: f64,
    pub close: f64,
    pub ma20: f64,
}

impl MarketRegime {
    pub fn max_position(&self) -> f64 {
        self.tier.max_position()
    }
}

pub fn classify(frame: &IndicatorFrame) -> Result<MarketRegime, SignalError> {
    let insufficient = || SignalError::InsufficientData {
        code: frame.code.clone(),
        bars: frame.len(),
        minimum: MIN_REGIME_BARS,
    };

    if frame.len() < MIN_REGIME_BARS {
        return Err(insufficient());
    }

    let curr = frame.latest().ok_or_else(insufficient)?;
    let earlier = frame.back(SLOPE_LAG).ok_or_else(insufficient)?;
    let ma20 = curr.ma20.ok_or_else(insufficient)?;
    let trailing_return_20d = frame.trailing_return(RETURN_WINDOW).ok_or_else(insufficient)?;

    let above_ma = gt(Some(curr.close), curr.ma20);
    let rising = ge(curr.ma20, earlier.ma20);
    let permitted = above_ma && rising;

    let tier = match (above_ma, rising) {
        (true, true) => RegimeTier::Aggressive,
        (true, false) => RegimeTier::Neutral,
        (false, _) => RegimeTier::Risk,
    };

    Ok(MarketRegime {
        benchmark: frame.code.clone(),
        permitted,
        tier,
        trailing_return_20d,
        close: curr.close,
        ma20,
    })
}
