//! End-to-end scan: benchmark regime, per-instrument verdicts, ranking.
//!
//! Bars are fetched sequentially through the [`DataPort`]; indicator and rule
//! evaluation then runs in parallel, one task per instrument, and the results
//! are collected back in pool order before ranking.

use crate::domain::error::SignalError;
use crate::domain::evaluator::{evaluate, EvaluatorConfig, InstrumentVerdict};
use crate::domain::indicator::compute_bars;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pool::InstrumentPool;
use crate::domain::ranking::{rank, RankedReport, DEFAULT_TOP_N};
use crate::domain::regime::{classify, MarketRegime};
use crate::ports::data_port::DataPort;
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

pub const DEFAULT_LOOKBACK_DAYS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub benchmark: String,
    pub pool: InstrumentPool,
    pub lookback_days: usize,
    pub top_n: usize,
    /// Supplied by the time-gating collaborator. Carried through to the
    /// report; it does not change any verdict.
    pub execution_window: bool,
    pub evaluator: EvaluatorConfig,
}

impl ScanConfig {
    pub fn new(benchmark: impl Into<String>, pool: InstrumentPool) -> Self {
        Self {
            benchmark: benchmark.into(),
            pool,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            top_n: DEFAULT_TOP_N,
            execution_window: false,
            evaluator: EvaluatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    FetchFailed { reason: String },
    Malformed { reason: String },
    InsufficientBars { bars: usize, minimum: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::FetchFailed { reason } => write!(f, "fetch failed: {}", reason),
            SkipReason::Malformed { reason } => write!(f, "malformed bars: {}", reason),
            SkipReason::InsufficientBars { bars, minimum } => {
                write!(f, "only {} bars, minimum {} required", bars, minimum)
            }
        }
    }
}

impl From<&SignalError> for SkipReason {
    fn from(err: &SignalError) -> Self {
        match err {
            SignalError::NoData { .. } => SkipReason::NoData,
            SignalError::InsufficientData { bars, minimum, .. } => SkipReason::InsufficientBars {
                bars: *bars,
                minimum: *minimum,
            },
            SignalError::MalformedBar { reason, .. } => SkipReason::Malformed {
                reason: reason.clone(),
            },
            other => SkipReason::FetchFailed {
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedInstrument {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub report: RankedReport,
    pub skipped: Vec<SkippedInstrument>,
    pub execution_window: bool,
}

impl ScanOutcome {
    /// BUY verdicts that may be acted on now: none outside the execution window.
    pub fn actionable_buys(&self) -> Vec<&InstrumentVerdict> {
        if !self.execution_window {
            return Vec::new();
        }
        self.report
            .ranked
            .iter()
            .filter(|v| v.is_actionable_buy())
            .collect()
    }
}

pub fn scan(data_port: &dyn DataPort, config: &ScanConfig) -> Result<ScanOutcome, SignalError> {
    info!(
        benchmark = %config.benchmark,
        instruments = config.pool.count(),
        lookback_days = config.lookback_days,
        "starting scan"
    );

    let regime = classify_benchmark(data_port, config)?;
    info!(
        benchmark = %regime.benchmark,
        permitted = regime.permitted,
        tier = %regime.tier,
        trailing_return_20d = regime.trailing_return_20d,
        "market regime classified"
    );

    let fetched: Vec<(String, Result<Vec<OhlcvBar>, SkipReason>)> = config
        .pool
        .codes()
        .map(|code| (code.to_string(), fetch(data_port, code, config.lookback_days)))
        .collect();

    let outcomes: Vec<Result<InstrumentVerdict, SkippedInstrument>> = fetched
        .into_par_iter()
        .map(|(code, bars)| {
            let bars = bars.map_err(|reason| SkippedInstrument {
                code: code.clone(),
                reason,
            })?;
            evaluate_bars(&code, bars, &regime, &config.evaluator).map_err(|e| {
                SkippedInstrument {
                    code: code.clone(),
                    reason: SkipReason::from(&e),
                }
            })
        })
        .collect();

    let mut verdicts = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(verdict) => {
                debug!(
                    code = %verdict.instrument_id,
                    action = %verdict.action,
                    strength = verdict.strength,
                    "instrument evaluated"
                );
                verdicts.push(verdict);
            }
            Err(skip) => {
                warn!(code = %skip.code, reason = %skip.reason, "skipping instrument");
                skipped.push(skip);
            }
        }
    }

    if !skipped.is_empty() {
        info!(
            evaluated = verdicts.len(),
            total = config.pool.count(),
            "some instruments were skipped"
        );
    }

    let report = rank(regime, verdicts, config.top_n);
    Ok(ScanOutcome {
        report,
        skipped,
        execution_window: config.execution_window,
    })
}

/// Any failure here is fatal to the scan: without a regime there are no verdicts.
pub fn classify_benchmark(
    data_port: &dyn DataPort,
    config: &ScanConfig,
) -> Result<MarketRegime, SignalError> {
    let bars = data_port.fetch_bars(&config.benchmark, config.lookback_days)?;
    if bars.is_empty() {
        return Err(SignalError::NoData {
            code: config.benchmark.clone(),
        });
    }
    let frame = compute_bars(&config.benchmark, bars)?;
    classify(&frame)
}

pub fn evaluate_bars(
    code: &str,
    bars: Vec<OhlcvBar>,
    regime: &MarketRegime,
    config: &EvaluatorConfig,
) -> Result<InstrumentVerdict, SignalError> {
    let frame = compute_bars(code, bars)?;
    evaluate(&frame, regime, config)
}

fn fetch(
    data_port: &dyn DataPort,
    code: &str,
    lookback_days: usize,
) -> Result<Vec<OhlcvBar>, SkipReason> {
    match data_port.fetch_bars(code, lookback_days) {
        Ok(bars) if bars.is_empty() => Err(SkipReason::NoData),
        Ok(bars) => Ok(bars),
        Err(e) => Err(SkipReason::from(&e)),
    }
}
