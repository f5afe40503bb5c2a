use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalysisError;
use crate::insights::format::{inr, pct};
use crate::insights::into_result;
use crate::models::{
    AnalysisResult, BucketAggregate, ClockTime, InsightData, InsightKind, Instrument,
    ProcessedTradeRecord,
};
use crate::stats::aggregate::{
    aggregate_by, aggregate_fixed, best_bucket, best_by, compute_bucket, group_by, worst_by,
};

const MORNING_START: u32 = 10 * 60 + 30;
const AFTERNOON_START: u32 = 12 * 60;
const CLOSING_START: u32 = 14 * 60;

/// Cells with fewer trades than this are not singled out in the text.
const MIN_CELL_TRADES: usize = 2;

/// Intraday session windows for the Indian cash and F&O market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "Opening (9:15-10:30)")]
    Opening,
    #[serde(rename = "Morning (10:30-12:00)")]
    Morning,
    #[serde(rename = "Afternoon (12:00-14:00)")]
    Afternoon,
    #[serde(rename = "Closing (14:00-15:30)")]
    Closing,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 4] = [
        TimeSlot::Opening,
        TimeSlot::Morning,
        TimeSlot::Afternoon,
        TimeSlot::Closing,
    ];

    /// Pre-open entries fold into Opening and post-close into Closing.
    pub fn from_time(time: ClockTime) -> Self {
        match time.minutes_since_midnight() {
            m if m < MORNING_START => TimeSlot::Opening,
            m if m < AFTERNOON_START => TimeSlot::Morning,
            m if m < CLOSING_START => TimeSlot::Afternoon,
            _ => TimeSlot::Closing,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Opening => "Opening (9:15-10:30)",
            TimeSlot::Morning => "Morning (10:30-12:00)",
            TimeSlot::Afternoon => "Afternoon (12:00-14:00)",
            TimeSlot::Closing => "Closing (14:00-15:30)",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInstrumentCell {
    pub time_slot: TimeSlot,
    pub instrument: Instrument,
    #[serde(flatten)]
    pub stats: BucketAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInstrumentSummary {
    pub best_combination: TimeInstrumentCell,
    pub worst_combination: TimeInstrumentCell,
    pub by_time_slot: Vec<BucketAggregate>,
    pub by_instrument: Vec<BucketAggregate>,
    pub best_time_slot: String,
    pub best_instrument: String,
    pub trades_without_time: usize,
}

pub type TimeInstrumentAnalysis = InsightData<TimeInstrumentCell, TimeInstrumentSummary>;

/// Cross-tabulates entry time slot against instrument category. Trades
/// without a recorded entry time are not eligible.
pub fn analyze_time_instrument(
    trades: &[ProcessedTradeRecord],
) -> AnalysisResult<TimeInstrumentAnalysis> {
    into_result(InsightKind::TimeInstrument, trades.len(), build(trades))
}

fn build(
    trades: &[ProcessedTradeRecord],
) -> Result<(TimeInstrumentAnalysis, usize), AnalysisError> {
    if trades.is_empty() {
        return Err(AnalysisError::NoTrades);
    }

    let timed: Vec<&ProcessedTradeRecord> = trades.iter().filter(|t| t.time_recorded).collect();
    if timed.is_empty() {
        return Err(AnalysisError::NoValidTrades(
            "no trades have a recorded entry time".to_string(),
        ));
    }

    let mut cells = group_by(&timed, |t| {
        Some((TimeSlot::from_time(t.entry_time), t.instrument))
    });
    // group_by keeps first-seen instrument order; the stable sort only
    // brings the slots into session order.
    cells.sort_by_key(|((slot, _), _)| *slot);

    let table: Vec<TimeInstrumentCell> = cells
        .into_iter()
        .map(|((slot, instrument), members)| TimeInstrumentCell {
            time_slot: slot,
            instrument,
            stats: compute_bucket(format!("{} / {}", slot, instrument), &members),
        })
        .collect();

    let (best, worst) = match (
        best_by(&table, |c| c.stats.total_pnl),
        worst_by(&table, |c| c.stats.total_pnl),
    ) {
        (Some(b), Some(w)) => (b.clone(), w.clone()),
        _ => return Err(AnalysisError::NoTrades),
    };

    let by_time_slot = aggregate_fixed(
        &timed,
        &TimeSlot::ALL,
        |t| Some(TimeSlot::from_time(t.entry_time)),
        |s| s.label().to_string(),
    );
    let by_instrument = aggregate_by(&timed, |t| Some(t.instrument), |i| i.to_string());

    let summary = TimeInstrumentSummary {
        best_time_slot: best_bucket(&by_time_slot)
            .map(|b| b.bucket.clone())
            .unwrap_or_default(),
        best_instrument: best_bucket(&by_instrument)
            .map(|b| b.bucket.clone())
            .unwrap_or_default(),
        best_combination: best,
        worst_combination: worst,
        by_time_slot,
        by_instrument,
        trades_without_time: trades.len() - timed.len(),
    };

    let insights = generate_insights(&table, &summary);
    let recommendations = generate_recommendations(&summary);

    Ok((
        InsightData {
            table,
            summary,
            insights,
            recommendations,
        },
        timed.len(),
    ))
}

fn generate_insights(table: &[TimeInstrumentCell], summary: &TimeInstrumentSummary) -> Vec<String> {
    let mut out = Vec::new();
    let best = &summary.best_combination;
    let worst = &summary.worst_combination;

    if best.stats.total_pnl > 0.0 {
        out.push(format!(
            "Best combination: {} during {} with {} across {} trades ({} win rate).",
            best.instrument,
            best.time_slot,
            inr(best.stats.total_pnl),
            best.stats.trade_count,
            pct(best.stats.win_rate)
        ));
    }
    if worst.stats.total_pnl < 0.0 {
        out.push(format!(
            "Worst combination: {} during {}, losing {}.",
            worst.instrument,
            worst.time_slot,
            inr(worst.stats.total_pnl.abs())
        ));
    }
    if !summary.best_time_slot.is_empty() {
        out.push(format!("Your strongest session is {}.", summary.best_time_slot));
    }

    let losing_cells = table
        .iter()
        .filter(|c| c.stats.trade_count >= MIN_CELL_TRADES && c.stats.win_rate < 40.0)
        .count();
    if losing_cells > 0 {
        out.push(format!(
            "{} time and instrument combination(s) with repeated trades win less than 40% of the time.",
            losing_cells
        ));
    }
    if summary.trades_without_time > 0 {
        out.push(format!(
            "{} trade(s) had no entry time and were left out.",
            summary.trades_without_time
        ));
    }
    out
}

fn generate_recommendations(summary: &TimeInstrumentSummary) -> Vec<String> {
    let mut out = Vec::new();
    let best = &summary.best_combination;
    let worst = &summary.worst_combination;
    if best.stats.total_pnl > 0.0 {
        out.push(format!(
            "Concentrate {} trades in the {} session.",
            best.instrument, best.time_slot
        ));
    }
    if worst.stats.total_pnl < 0.0 {
        out.push(format!(
            "Avoid trading {} during {}.",
            worst.instrument, worst.time_slot
        ));
    }
    if summary.trades_without_time > 0 {
        out.push("Record entry times for every trade to sharpen this analysis.".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TradeBuilder;

    #[test]
    fn slot_boundaries() {
        assert_eq!(TimeSlot::from_time(ClockTime::new(9, 0, 0)), TimeSlot::Opening);
        assert_eq!(TimeSlot::from_time(ClockTime::new(10, 29, 59)), TimeSlot::Opening);
        assert_eq!(TimeSlot::from_time(ClockTime::new(10, 30, 0)), TimeSlot::Morning);
        assert_eq!(TimeSlot::from_time(ClockTime::new(12, 0, 0)), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_time(ClockTime::new(14, 0, 0)), TimeSlot::Closing);
        assert_eq!(TimeSlot::from_time(ClockTime::new(15, 45, 0)), TimeSlot::Closing);
    }

    #[test]
    fn cells_ordered_by_slot_then_first_seen_instrument() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", 50.0).symbol("NIFTY").at(14, 10).build(),
            TradeBuilder::new("2025-01-13", 80.0).symbol("BANKNIFTY").at(9, 30).build(),
            TradeBuilder::new("2025-01-13", -30.0).symbol("NIFTY").at(9, 45).build(),
            TradeBuilder::new("2025-01-14", 20.0).symbol("BANKNIFTY").at(9, 50).build(),
        ];
        let data = analyze_time_instrument(&trades).data.unwrap();
        let cells: Vec<(TimeSlot, Instrument)> =
            data.table.iter().map(|c| (c.time_slot, c.instrument)).collect();
        assert_eq!(
            cells,
            vec![
                (TimeSlot::Opening, Instrument::BankNifty),
                (TimeSlot::Opening, Instrument::Nifty),
                (TimeSlot::Closing, Instrument::Nifty),
            ]
        );
        assert_eq!(data.table[0].stats.total_pnl, 100.0);
        assert_eq!(data.summary.best_combination.instrument, Instrument::BankNifty);
        assert_eq!(data.summary.worst_combination.time_slot, TimeSlot::Opening);
        assert_eq!(data.summary.best_time_slot, "Opening (9:15-10:30)");
    }

    #[test]
    fn untimed_trades_are_excluded() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", 50.0).untimed().build(),
            TradeBuilder::new("2025-01-13", 10.0).at(11, 0).build(),
        ];
        let result = analyze_time_instrument(&trades);
        assert_eq!(result.metadata.valid_trades, 1);
        assert_eq!(result.data.unwrap().summary.trades_without_time, 1);
    }

    #[test]
    fn fails_when_no_trade_has_a_time() {
        let trades = vec![TradeBuilder::new("2025-01-13", 50.0).untimed().build()];
        let result = analyze_time_instrument(&trades);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("entry time"));
    }
}
