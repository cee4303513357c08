//! Report rendering port trait.

use crate::domain::error::SignalError;
use crate::domain::pipeline::ScanOutcome;
use crate::domain::pool::InstrumentPool;

/// Port for presenting a finished scan.
pub trait ReportPort {
    fn render(&self, outcome: &ScanOutcome, pool: &InstrumentPool) -> String;

    /// Default implementation: render and write to `output_path`, or stdout.
    fn write(
        &self,
        outcome: &ScanOutcome,
        pool: &InstrumentPool,
        output_path: Option<&std::path::Path>,
    ) -> Result<(), SignalError> {
        let content = self.render(outcome, pool);
        match output_path {
            Some(path) => std::fs::write(path, content)?,
            None => print!("{}", content),
        }
        Ok(())
    }
}
