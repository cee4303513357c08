//! CSV file data adapter.
//!
//! One file per instrument, `<dir>/<code>.csv`, with a header row. Columns are
//! found by header name regardless of case or surrounding whitespace.

use crate::domain::error::SignalError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn resolve(code: &str, headers: &csv::StringRecord) -> Result<Self, SignalError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| SignalError::MalformedBar {
                    code: code.to_string(),
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Self {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }

    /// Every row of the instrument's file, in file order. `None` when the
    /// file does not exist.
    fn read_all(&self, code: &str) -> Result<Option<Vec<OhlcvBar>>, SignalError> {
        let path = self.csv_path(code);
        let mut rdr = match csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(&path) {
            Ok(rdr) => rdr,
            Err(e) => {
                if let csv::ErrorKind::Io(io_err) = e.kind() {
                    if io_err.kind() == io::ErrorKind::NotFound {
                        return Ok(None);
                    }
                }
                return Err(SignalError::DataSource {
                    code: code.to_string(),
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let headers = rdr.headers().map_err(|e| SignalError::DataSource {
            code: code.to_string(),
            reason: format!("failed to read header of {}: {}", path.display(), e),
        })?;
        let columns = Columns::resolve(code, headers)?;

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| SignalError::DataSource {
                code: code.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;
            bars.push(parse_record(code, line + 1, &record, &columns)?);
        }

        debug!(code, bars = bars.len(), path = %path.display(), "read csv");
        Ok(Some(bars))
    }
}

fn parse_record(
    code: &str,
    row: usize,
    record: &csv::StringRecord,
    columns: &Columns,
) -> Result<OhlcvBar, SignalError> {
    let malformed = |reason: String| SignalError::MalformedBar {
        code: code.to_string(),
        reason: format!("row {}: {}", row, reason),
    };

    let field = |index: usize, name: &str| -> Result<f64, SignalError> {
        let raw = record.get(index).unwrap_or("");
        if raw.is_empty() {
            return Err(malformed(format!("empty {} value", name)));
        }
        raw.parse::<f64>()
            .map_err(|e| malformed(format!("invalid {} value {:?}: {}", name, raw, e)))
    };

    let date_str = record.get(columns.date).unwrap_or("");
    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|e| malformed(format!("invalid date {:?}: {}", date_str, e)))?;

    Ok(OhlcvBar {
        code: code.to_string(),
        date,
        open: field(columns.open, "open")?,
        high: field(columns.high, "high")?,
        low: field(columns.low, "low")?,
        close: field(columns.close, "close")?,
        volume: field(columns.volume, "volume")?,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, code: &str, lookback_days: usize) -> Result<Vec<OhlcvBar>, SignalError> {
        let mut bars = self.read_all(code)?.unwrap_or_default();
        if bars.len() > lookback_days {
            bars.drain(..bars.len() - lookback_days);
        }
        Ok(bars)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SignalError> {
        let bars = match self.read_all(code)? {
            Some(bars) => bars,
            None => return Ok(None),
        };
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
