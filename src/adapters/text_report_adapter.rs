//! Plain-text report adapter implementing ReportPort.
//!
//! Sections: market regime, full ranking, shortlist, BUY risk plans, skipped
//! instruments. Built section by section into one string.

use crate::domain::evaluator::{Action, InstrumentVerdict};
use crate::domain::pipeline::ScanOutcome;
use crate::domain::pool::InstrumentPool;
use crate::domain::regime::MarketRegime;
use crate::ports::report_port::ReportPort;

/// Suffix on BUY actions outside the execution window.
const PENDING_MARK: &str = " (pending)";

#[derive(Debug, Default)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for TextReportAdapter {
    fn render(&self, outcome: &ScanOutcome, pool: &InstrumentPool) -> String {
        let mut output = String::new();
        output.push_str(&render_market(&outcome.report.market, outcome.execution_window));
        output.push_str(&render_ranking(outcome, pool));
        output.push_str(&render_shortlist(outcome, pool));
        output.push_str(&render_risk_plans(&outcome.report.ranked, pool));
        output.push_str(&render_skipped(outcome));
        output
    }
}

fn render_market(market: &MarketRegime, execution_window: bool) -> String {
    let mut output = String::new();
    output.push_str("== Market Regime ==\n");
    output.push_str(&format!(
        "Benchmark {}: {} ({})\n",
        market.benchmark,
        if market.permitted { "PERMITTED" } else { "BLOCKED" },
        market.tier
    ));
    output.push_str(&format!(
        "Close {:.2}  MA20 {:.2}  20d return {:+.2}%  max position {:.0}%\n",
        market.close,
        market.ma20,
        market.trailing_return_20d,
        market.max_position() * 100.0
    ));
    output.push_str(&format!(
        "Execution window: {}\n\n",
        if execution_window { "open" } else { "closed" }
    ));
    output
}

fn action_label(verdict: &InstrumentVerdict, execution_window: bool) -> String {
    if verdict.action == Action::Buy && !execution_window {
        format!("{}{}", verdict.action, PENDING_MARK)
    } else {
        verdict.action.to_string()
    }
}

fn render_row(
    rank: usize,
    verdict: &InstrumentVerdict,
    pool: &InstrumentPool,
    window: bool,
) -> String {
    let kdj = verdict
        .kdj_k
        .map(|k| format!("{:.1}", k))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>3}  {:<8} {:<32} {:<14} {:>9.2} {:>8.2}% {:>6} {:>5.0}%  {}\n",
        rank,
        verdict.instrument_id,
        pool.name_of(&verdict.instrument_id),
        action_label(verdict, window),
        verdict.strength,
        verdict.return_20d,
        kdj,
        verdict.position_fraction * 100.0,
        verdict.note
    )
}

fn table_header() -> String {
    format!(
        "{:>3}  {:<8} {:<32} {:<14} {:>9} {:>9} {:>6} {:>6}  {}\n",
        "#", "Code", "Name", "Action", "Strength", "Ret20d", "KDJ-K", "Size", "Note"
    )
}

fn render_ranking(outcome: &ScanOutcome, pool: &InstrumentPool) -> String {
    let report = &outcome.report;
    let mut output = String::new();
    output.push_str(&format!(
        "== Ranking ({} evaluated: {} BUY, {} SELL, {} WAIT) ==\n",
        report.ranked.len(),
        report.count(Action::Buy),
        report.count(Action::Sell),
        report.count(Action::Wait)
    ));
    if report.ranked.is_empty() {
        output.push_str("No instruments evaluated.\n\n");
        return output;
    }
    output.push_str(&table_header());
    for (i, verdict) in report.ranked.iter().enumerate() {
        output.push_str(&render_row(i + 1, verdict, pool, outcome.execution_window));
    }
    output.push('\n');
    output
}

fn render_shortlist(outcome: &ScanOutcome, pool: &InstrumentPool) -> String {
    let top = outcome.report.top_n();
    let mut output = String::new();
    output.push_str(&format!("== Top {} ==\n", outcome.report.shortlist_len()));
    if top.is_empty() {
        output.push_str("(none)\n\n");
        return output;
    }
    for (i, verdict) in top.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} {}  {}  strength {:.2}\n",
            i + 1,
            verdict.instrument_id,
            pool.name_of(&verdict.instrument_id),
            action_label(verdict, outcome.execution_window),
            verdict.strength
        ));
    }
    output.push('\n');
    output
}

fn render_risk_plans(ranked: &[InstrumentVerdict], pool: &InstrumentPool) -> String {
    let plans: Vec<_> = ranked
        .iter()
        .filter_map(|v| v.risk.as_ref().map(|r| (v, r)))
        .collect();
    if plans.is_empty() {
        return String::new();
    }

    let mut output = String::new();
    output.push_str("== Risk Plans ==\n");
    for (verdict, plan) in plans {
        output.push_str(&format!(
            "{} {}: entry {:.3}  stop {:.3}  target {:.3} / {:.3}\n",
            verdict.instrument_id,
            pool.name_of(&verdict.instrument_id),
            plan.entry,
            plan.stop_loss,
            plan.take_profit,
            plan.take_profit_extended
        ));
    }
    output.push('\n');
    output
}

fn render_skipped(outcome: &ScanOutcome) -> String {
    if outcome.skipped.is_empty() {
        return String::new();
    }
    let mut output = String::new();
    output.push_str(&format!("== Skipped ({}) ==\n", outcome.skipped.len()));
    for skip in &outcome.skipped {
        output.push_str(&format!("{}: {}\n", skip.code, skip.reason));
    }
    output
}
