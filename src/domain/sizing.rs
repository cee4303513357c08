//! Position sizing and risk levels for BUY verdicts.
//!
//! The oscillator overlay de-rates or blocks entries into overheated moves;
//! the risk plan turns the configured percentages into price levels off the
//! latest close.

use std::fmt;

pub const MAX_POSITION_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct SizingConfig {
    pub normal_fraction: f64,
    pub derated_fraction: f64,
    /// Above this K the entry is de-rated.
    pub derate_kdj: f64,
    /// Above this K there is no entry at all.
    pub extreme_kdj: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            normal_fraction: 0.3,
            derated_fraction: 0.2,
            derate_kdj: 85.0,
            extreme_kdj: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Normal,
    Derated,
    Blocked,
}

impl fmt::Display for SizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeTier::Normal => write!(f, "normal"),
            SizeTier::Derated => write!(f, "overheat de-rated"),
            SizeTier::Blocked => write!(f, "extreme overheat, no entry"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub fraction: f64,
    pub tier: SizeTier,
}

/// Size a BUY from the oscillator reading, capped at `cap`.
pub fn size_position(kdj_k: Option<f64>, config: &SizingConfig, cap: f64) -> PositionSize {
    let (fraction, tier) = match kdj_k {
        Some(k) if k > config.extreme_kdj => (0.0, SizeTier::Blocked),
        Some(k) if k > config.derate_kdj => (config.derated_fraction, SizeTier::Derated),
        _ => (config.normal_fraction, SizeTier::Normal),
    };
    let cap = cap.clamp(0.0, MAX_POSITION_FRACTION);
    PositionSize {
        fraction: fraction.clamp(0.0, cap),
        tier,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub take_profit_extended_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: 4.0,
            take_profit_pct: 6.0,
            take_profit_extended_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskPlan {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub take_profit_extended: f64,
}

impl RiskPlan {
    pub fn from_entry(entry: f64, config: &RiskConfig) -> Self {
        Self {
            entry,
            stop_loss: entry * (1.0 - config.stop_loss_pct / 100.0),
            take_profit: entry * (1.0 + config.take_profit_pct / 100.0),
            take_profit_extended: entry * (1.0 + config.take_profit_extended_pct / 100.0),
        }
    }
}
