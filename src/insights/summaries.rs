use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::insights::direction_analysis::direction_specialization;
use crate::insights::format::{inr, inr_signed, pct, ratio};
use crate::insights::orchestrator::PerformanceOverview;
use crate::insights::InsightReport;
use crate::models::{BucketAggregate, Direction, InsightKind};

const LOW_WIN_RATE: f64 = 40.0;
/// Drawdown larger than this share of gross profit is flagged.
const DRAWDOWN_WARNING_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedInsights {
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_warnings: Vec<String>,
}

pub fn bucket_line(b: &BucketAggregate) -> String {
    format!(
        "{}: {} trades | P&L {} | avg {} | win rate {} | PF {}",
        b.bucket,
        b.trade_count,
        inr_signed(b.total_pnl),
        inr(b.avg_pnl),
        pct(b.win_rate),
        ratio(b.profit_factor)
    )
}

/// A short paragraph for one completed insight: its headline findings and
/// the first suggestion.
pub fn concise_summary(report: &InsightReport) -> String {
    let suggestion = report.recommendations().first().map(|r| format!("Suggestion: {}", r));
    let mut parts: Vec<&str> = report.insights().iter().take(2).map(String::as_str).collect();
    parts.extend(suggestion.as_deref());
    if parts.is_empty() {
        return format!("{}: no notable patterns yet.", report.kind().title());
    }
    format!("{}: {}", report.kind().title(), parts.join(" "))
}

pub fn concise_summaries(
    reports: &BTreeMap<InsightKind, InsightReport>,
) -> BTreeMap<InsightKind, String> {
    reports
        .iter()
        .map(|(kind, report)| (*kind, concise_summary(report)))
        .collect()
}

/// Cross-insight roll-up: the lead finding and recommendation from each
/// report plus risk warnings drawn from the overall numbers.
pub fn consolidate(
    reports: &BTreeMap<InsightKind, InsightReport>,
    overview: &PerformanceOverview,
) -> ConsolidatedInsights {
    let mut out = ConsolidatedInsights::default();

    for report in reports.values() {
        if let Some(finding) = report.insights().first() {
            out.key_findings.push(finding.clone());
        }
        if let Some(rec) = report.recommendations().first() {
            if !out.recommendations.contains(rec) {
                out.recommendations.push(rec.clone());
            }
        }
    }

    if overview.total_trades > 0 && overview.win_rate < LOW_WIN_RATE {
        out.risk_warnings.push(format!(
            "Overall win rate is only {}.",
            pct(overview.win_rate)
        ));
    }
    if overview.total_pnl < 0.0 {
        out.risk_warnings.push(format!(
            "The account is net negative at {}.",
            inr(overview.total_pnl)
        ));
    }
    if overview.gross_profit > 0.0
        && overview.max_drawdown > overview.gross_profit * DRAWDOWN_WARNING_SHARE
    {
        out.risk_warnings.push(format!(
            "Maximum drawdown of {} is large relative to gross profit.",
            inr(overview.max_drawdown)
        ));
    }
    if overview.expectancy < 0.0 {
        out.risk_warnings.push(format!(
            "Negative expectancy: each trade loses {} on average.",
            inr(overview.expectancy.abs())
        ));
    }

    for report in reports.values() {
        match report {
            InsightReport::TradeSequence(d)
                if d.summary.post_loss_trades > 0
                    && d.summary.post_loss_win_rate < d.summary.overall_win_rate =>
            {
                out.risk_warnings.push(format!(
                    "Trades taken right after a loss win only {}, a revenge trading pattern.",
                    pct(d.summary.post_loss_win_rate)
                ));
            }
            InsightReport::TradeCount(d)
                if d.summary.overtrading_days > 0 && d.summary.overtrading_pnl < 0.0 =>
            {
                out.risk_warnings.push(format!(
                    "Overtrading: {} heavy day(s) lost {}.",
                    d.summary.overtrading_days,
                    inr(d.summary.overtrading_pnl.abs())
                ));
            }
            InsightReport::Direction(d) => {
                if let Some(dir) = direction_specialization(&d.summary) {
                    let weak = match dir.opposite() {
                        Direction::Long => &d.summary.long,
                        Direction::Short => &d.summary.short,
                    };
                    if let Some(weak) = weak.as_ref().filter(|w| w.total_pnl < 0.0) {
                        out.risk_warnings.push(format!(
                            "{} trades are a consistent drain at {}.",
                            weak.bucket,
                            inr(weak.total_pnl)
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{run_insight, InsightOptions};
    use crate::stats::aggregate::compute_bucket;
    use crate::test_helpers::TradeBuilder;

    #[test]
    fn bucket_line_formats_money_and_rates() {
        let b = compute_bucket("Monday", &[300.0, -100.0]);
        assert_eq!(
            bucket_line(&b),
            "Monday: 2 trades | P&L +₹200.00 | avg ₹100.00 | win rate 50.0% | PF 3.00"
        );
    }

    #[test]
    fn concise_summary_leads_with_title() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", 500.0).build(),
            TradeBuilder::new("2025-01-14", -200.0).build(),
        ];
        let report = run_insight(InsightKind::DayOfWeek, &trades, &InsightOptions::default())
            .data
            .unwrap();
        let text = concise_summary(&report);
        assert!(text.starts_with("Day of Week Performance: Monday is your most profitable day"));
        assert!(text.contains("Suggestion: Prioritize Monday"));
    }

    #[test]
    fn negative_account_raises_warnings() {
        let overview = PerformanceOverview {
            total_trades: 4,
            total_pnl: -300.0,
            win_rate: 25.0,
            gross_profit: 100.0,
            max_drawdown: 400.0,
            expectancy: -75.0,
            ..PerformanceOverview::default()
        };
        let consolidated = consolidate(&BTreeMap::new(), &overview);
        assert_eq!(consolidated.risk_warnings.len(), 4);
        assert!(consolidated.key_findings.is_empty());
    }
}
