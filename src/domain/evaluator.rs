//! Per-instrument rule evaluation.
//!
//! # Evaluation order
//!
//! 1. SELL if any exit trigger fires, regardless of the market regime.
//! 2. BUY only if the regime permits it and every entry condition holds.
//! 3. WAIT otherwise.
//!
//! A BUY then passes through the oscillator sizing overlay; an entry sized to
//! nothing because of an extreme reading is reported as WAIT.
//!
//! Every comparison against an undefined indicator value is false, so
//! missing history can suppress a trigger but never raise one.

use crate::domain::error::SignalError;
use crate::domain::indicator::{IndicatorFrame, IndicatorRow, RETURN_WINDOW, ge, gt, le, lt};
use crate::domain::regime::MarketRegime;
use crate::domain::sizing::{RiskConfig, RiskPlan, SizeTier, SizingConfig, size_position};
use chrono::NaiveDate;
use std::fmt;

pub const MIN_EVALUATION_BARS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// BUY requires K at or below this.
    pub buy_kdj_ceiling: f64,
    /// K above this and falling is an exit trigger.
    pub sell_kdj_overheat: f64,
    pub sizing: SizingConfig,
    pub risk: RiskConfig,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            buy_kdj_ceiling: 85.0,
            sell_kdj_overheat: 80.0,
            sizing: SizingConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Wait => write!(f, "WAIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellTrigger {
    /// Close below MA20.
    TrendBroken,
    /// MACD crossed below its signal line this session.
    MacdCrossDown,
    /// Lower close on above-average volume.
    DeclineOnVolume,
    /// K above the overheat level and turning down.
    OscillatorRollover,
}

impl fmt::Display for SellTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SellTrigger::TrendBroken => write!(f, "trend broken"),
            SellTrigger::MacdCrossDown => write!(f, "macd crossed down"),
            SellTrigger::DeclineOnVolume => write!(f, "decline on volume"),
            SellTrigger::OscillatorRollover => write!(f, "overheat rollover"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentVerdict {
    pub instrument_id: String,
    pub date: NaiveDate,
    pub close: f64,
    pub action: Action,
    pub strength: f64,
    pub return_20d: f64,
    pub kdj_k: Option<f64>,
    pub position_fraction: f64,
    pub note: String,
    pub sell_triggers: Vec<SellTrigger>,
    pub risk: Option<RiskPlan>,
}

impl InstrumentVerdict {
    pub fn is_actionable_buy(&self) -> bool {
        self.action == Action::Buy && self.position_fraction > 0.0
    }
}

pub fn evaluate(
    frame: &IndicatorFrame,
    regime: &MarketRegime,
    config: &EvaluatorConfig,
) -> Result<InstrumentVerdict, SignalError> {
    let insufficient = || SignalError::InsufficientData {
        code: frame.code.clone(),
        bars: frame.len(),
        minimum: MIN_EVALUATION_BARS,
    };

    if frame.len() < MIN_EVALUATION_BARS {
        return Err(insufficient());
    }

    let curr = frame.latest().ok_or_else(insufficient)?;
    let prev = frame.back(1).ok_or_else(insufficient)?;
    let return_20d = frame.trailing_return(RETURN_WINDOW).ok_or_else(insufficient)?;
    let slope = curr.ma20_slope.ok_or_else(insufficient)?;
    let strength = return_20d - regime.trailing_return_20d + slope;

    let sell_triggers = sell_triggers(curr, prev, config);

    let (action, position_fraction, note, risk) = if !sell_triggers.is_empty() {
        let note = sell_triggers
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        (Action::Sell, 0.0, note, None)
    } else if !regime.permitted {
        (Action::Wait, 0.0, "market regime blocks entry".to_string(), None)
    } else if buy_conditions_hold(curr, prev, return_20d, regime, config) {
        let size = size_position(curr.kdj_k, &config.sizing, regime.max_position());
        if size.tier == SizeTier::Blocked {
            (Action::Wait, 0.0, size.tier.to_string(), None)
        } else {
            let plan = RiskPlan::from_entry(curr.close, &config.risk);
            (Action::Buy, size.fraction, size.tier.to_string(), Some(plan))
        }
    } else {
        (Action::Wait, 0.0, "entry conditions not met".to_string(), None)
    };

    Ok(InstrumentVerdict {
        instrument_id: frame.code.clone(),
        date: curr.date,
        close: curr.close,
        action,
        strength,
        return_20d,
        kdj_k: curr.kdj_k,
        position_fraction,
        note,
        sell_triggers,
        risk,
    })
}

fn sell_triggers(
    curr: &IndicatorRow,
    prev: &IndicatorRow,
    config: &EvaluatorConfig,
) -> Vec<SellTrigger> {
    let mut triggers = Vec::new();

    if lt(Some(curr.close), curr.ma20) {
        triggers.push(SellTrigger::TrendBroken);
    }
    if curr.macd_below_signal() && ge(prev.macd, prev.signal) {
        triggers.push(SellTrigger::MacdCrossDown);
    }
    if curr.close < prev.close && gt(Some(curr.volume), curr.vol_ma5) {
        triggers.push(SellTrigger::DeclineOnVolume);
    }
    if gt(curr.kdj_k, Some(config.sell_kdj_overheat)) && lt(curr.kdj_k, prev.kdj_k) {
        triggers.push(SellTrigger::OscillatorRollover);
    }

    triggers
}

fn buy_conditions_hold(
    curr: &IndicatorRow,
    prev: &IndicatorRow,
    return_20d: f64,
    regime: &MarketRegime,
    config: &EvaluatorConfig,
) -> bool {
    regime.permitted
        && gt(Some(curr.close), curr.ma20)
        && return_20d > regime.trailing_return_20d
        && curr.macd_above_signal()
        && prev.macd_above_signal()
        && le(curr.kdj_k, Some(config.buy_kdj_ceiling))
        && gt(Some(curr.volume), curr.vol_ma5)
        && curr.close > prev.close
}
