//! Configuration validation.
//!
//! Validates all config fields before a scan runs.

use crate::domain::error::SignalError;
use crate::domain::evaluator::MIN_EVALUATION_BARS;
use crate::domain::pipeline::DEFAULT_LOOKBACK_DAYS;
use crate::domain::pool::parse_pool;
use crate::domain::sizing::MAX_POSITION_FRACTION;
use crate::ports::config_port::ConfigPort;

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    validate_benchmark(config)?;
    validate_pool(config)?;
    validate_lookback(config)?;
    validate_top_n(config)?;
    validate_kdj_thresholds(config)?;
    validate_fractions(config)?;
    validate_risk(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SignalError {
    SignalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_benchmark(config: &dyn ConfigPort) -> Result<(), SignalError> {
    match config.get_string("market", "benchmark") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SignalError::ConfigMissing {
            section: "market".to_string(),
            key: "benchmark".to_string(),
        }),
    }
}

fn validate_pool(config: &dyn ConfigPort) -> Result<(), SignalError> {
    match config.get_string("pool", "instruments") {
        Some(s) if !s.trim().is_empty() => parse_pool(&s)
            .map(|_| ())
            .map_err(|e| invalid("pool", "instruments", e.to_string())),
        _ => Err(SignalError::ConfigMissing {
            section: "pool".to_string(),
            key: "instruments".to_string(),
        }),
    }
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let value = config.get_int("data", "lookback_days", DEFAULT_LOOKBACK_DAYS as i64);
    if value < MIN_EVALUATION_BARS as i64 {
        return Err(invalid(
            "data",
            "lookback_days",
            format!("lookback_days must be at least {}", MIN_EVALUATION_BARS),
        ));
    }
    Ok(())
}

fn validate_top_n(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let value = config.get_int("scan", "top_n", 3);
    if value < 1 {
        return Err(invalid("scan", "top_n", "top_n must be at least 1"));
    }
    Ok(())
}

fn validate_kdj_thresholds(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let keys = [
        ("buy_kdj_ceiling", 85.0),
        ("sell_kdj_overheat", 80.0),
        ("derate_kdj", 85.0),
        ("extreme_kdj", 90.0),
    ];
    for (key, default) in keys {
        let value = config.get_double("signal", key, default);
        if !value.is_finite() || value <= 0.0 || value > 100.0 {
            return Err(invalid("signal", key, format!("{} must be in (0, 100]", key)));
        }
    }

    let derate = config.get_double("signal", "derate_kdj", 85.0);
    let extreme = config.get_double("signal", "extreme_kdj", 90.0);
    if derate > extreme {
        return Err(invalid(
            "signal",
            "derate_kdj",
            "derate_kdj must not exceed extreme_kdj",
        ));
    }

    let ceiling = config.get_double("signal", "buy_kdj_ceiling", 85.0);
    let tuned = ["buy_kdj_ceiling", "derate_kdj"]
        .iter()
        .any(|key| config.get_string("signal", key).is_some());
    if tuned && ceiling <= derate {
        tracing::warn!(
            buy_kdj_ceiling = ceiling,
            derate_kdj = derate,
            "buy_kdj_ceiling at or below derate_kdj, derated sizing never applies"
        );
    }
    Ok(())
}

fn validate_fractions(config: &dyn ConfigPort) -> Result<(), SignalError> {
    for (key, default) in [("normal_fraction", 0.3), ("derated_fraction", 0.2)] {
        let value = config.get_double("sizing", key, default);
        if !(0.0..=MAX_POSITION_FRACTION).contains(&value) {
            return Err(invalid(
                "sizing",
                key,
                format!("{} must be between 0 and {}", key, MAX_POSITION_FRACTION),
            ));
        }
    }
    Ok(())
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let stop = config.get_double("risk", "stop_loss_pct", 4.0);
    if !stop.is_finite() || stop <= 0.0 || stop >= 100.0 {
        return Err(invalid(
            "risk",
            "stop_loss_pct",
            "stop_loss_pct must be between 0 and 100",
        ));
    }
    for (key, default) in [("take_profit_pct", 6.0), ("take_profit_extended_pct", 10.0)] {
        let value = config.get_double("risk", key, default);
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid("risk", key, format!("{} must be positive and finite", key)));
        }
    }
    Ok(())
}
