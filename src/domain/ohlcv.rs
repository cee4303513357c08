//! Daily OHLCV bars and the validated per-instrument series.

use crate::domain::error::SignalError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Bars for one instrument, strictly ascending by date.
///
/// Construction is the only place a series is checked; everything downstream
/// trusts the ordering, the owning code and the finiteness of every field.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    code: String,
    bars: Vec<OhlcvBar>,
}

impl BarSeries {
    pub fn new(code: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, SignalError> {
        let code = code.into();
        for (i, bar) in bars.iter().enumerate() {
            if bar.code != code {
                return Err(SignalError::MalformedBar {
                    reason: format!("bar for {} on {}", bar.code, bar.date),
                    code,
                });
            }
            let fields = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
            ];
            for (name, value) in fields {
                if !value.is_finite() {
                    return Err(SignalError::MalformedBar {
                        code,
                        reason: format!("non-finite {} on {}", name, bar.date),
                    });
                }
            }
            if bar.high < bar.low {
                return Err(SignalError::MalformedBar {
                    code,
                    reason: format!("high {} below low {} on {}", bar.high, bar.low, bar.date),
                });
            }
            if bar.close <= 0.0 {
                return Err(SignalError::MalformedBar {
                    code,
                    reason: format!("non-positive close {} on {}", bar.close, bar.date),
                });
            }
            if bar.volume < 0.0 {
                return Err(SignalError::MalformedBar {
                    code,
                    reason: format!("negative volume on {}", bar.date),
                });
            }
            if i > 0 {
                let prev = bars[i - 1].date;
                if bar.date == prev {
                    return Err(SignalError::MalformedBar {
                        code,
                        reason: format!("duplicate date {}", bar.date),
                    });
                }
                if bar.date < prev {
                    return Err(SignalError::MalformedBar {
                        code,
                        reason: format!("date {} follows later date {}", bar.date, prev),
                    });
                }
            }
        }
        Ok(Self { code, bars })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bars up to and including index `end`.
    pub fn truncated(&self, end: usize) -> BarSeries {
        let end = (end + 1).min(self.bars.len());
        BarSeries {
            code: self.code.clone(),
            bars: self.bars[..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> OhlcvBar {
        OhlcvBar {
            code: "510300".into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10_000.0,
        }
    }

    #[test]
    fn accepts_ascending_series() {
        let series = BarSeries::new(
            "510300",
            vec![bar("2024-01-02", 1.0), bar("2024-01-03", 2.0)],
        )
        .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.code(), "510300");
    }

    #[test]
    fn empty_series_is_valid() {
        let series = BarSeries::new("510300", vec![]).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = BarSeries::new(
            "510300",
            vec![bar("2024-01-02", 1.0), bar("2024-01-02", 2.0)],
        )
        .unwrap_err();
        assert!(
            matches!(err, SignalError::MalformedBar { ref code, ref reason }
                if code == "510300" && reason.contains("duplicate"))
        );
    }

    #[test]
    fn rejects_descending_dates() {
        let err = BarSeries::new(
            "510300",
            vec![bar("2024-01-03", 1.0), bar("2024-01-02", 2.0)],
        )
        .unwrap_err();
        assert!(matches!(err, SignalError::MalformedBar { .. }));
    }

    #[test]
    fn rejects_nan_close() {
        let mut gap = bar("2024-01-02", 10.0);
        gap.close = f64::NAN;
        let err = BarSeries::new("510300", vec![gap]).unwrap_err();
        assert!(
            matches!(err, SignalError::MalformedBar { ref reason, .. } if reason.contains("non-finite close"))
        );
    }

    #[test]
    fn rejects_zero_close() {
        let err = BarSeries::new("510300", vec![bar("2024-01-02", 0.0)]).unwrap_err();
        assert!(matches!(err, SignalError::MalformedBar { .. }));
    }

    #[test]
    fn rejects_bar_from_another_instrument() {
        let mut stray = bar("2024-01-03", 2.0);
        stray.code = "159516".into();
        let err = BarSeries::new("510300", vec![bar("2024-01-02", 1.0), stray]).unwrap_err();
        assert!(
            matches!(err, SignalError::MalformedBar { ref code, ref reason }
                if code == "510300" && reason.contains("159516"))
        );
    }

    #[test]
    fn rejects_high_below_low() {
        let mut inverted = bar("2024-01-02", 10.0);
        inverted.high = 9.0;
        inverted.low = 11.0;
        let err = BarSeries::new("510300", vec![inverted]).unwrap_err();
        assert!(
            matches!(err, SignalError::MalformedBar { ref reason, .. } if reason.contains("below low"))
        );
    }

    #[test]
    fn accepts_flat_session() {
        let mut flat = bar("2024-01-02", 10.0);
        flat.high = 10.0;
        flat.low = 10.0;
        assert!(BarSeries::new("510300", vec![flat]).is_ok());
    }

    #[test]
    fn truncated_keeps_prefix() {
        let series = BarSeries::new(
            "510300",
            vec![
                bar("2024-01-02", 1.0),
                bar("2024-01-03", 2.0),
                bar("2024-01-04", 3.0),
            ],
        )
        .unwrap();
        let head = series.truncated(1);
        assert_eq!(head.len(), 2);
        assert_eq!(head.bars()[1].close, 2.0);
    }
}
