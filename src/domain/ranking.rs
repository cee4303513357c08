//! Relative strength ranking.

use crate::domain::evaluator::{Action, InstrumentVerdict};
use crate::domain::regime::MarketRegime;

pub const DEFAULT_TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedReport {
    pub market: MarketRegime,
    /// All verdicts, strongest first.
    pub ranked: Vec<InstrumentVerdict>,
    top_n: usize,
}

impl RankedReport {
    /// Head of the ranking; the full list stays in `ranked`.
    pub fn top_n(&self) -> &[InstrumentVerdict] {
        &self.ranked[..self.top_n.min(self.ranked.len())]
    }

    pub fn shortlist_len(&self) -> usize {
        self.top_n
    }

    pub fn count(&self, action: Action) -> usize {
        self.ranked.iter().filter(|v| v.action == action).count()
    }
}

/// Sort by strength, strongest first. `sort_by` is stable, so equal strengths
/// keep their pool order.
pub fn rank(market: MarketRegime, mut verdicts: Vec<InstrumentVerdict>, top_n: usize) -> RankedReport {
    verdicts.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    RankedReport {
        market,
        ranked: verdicts,
        top_n,
    }
}
