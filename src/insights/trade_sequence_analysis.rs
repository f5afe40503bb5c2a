use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalysisError;
use crate::insights::format::{inr, pct};
use crate::insights::into_result;
use crate::models::{
    AnalysisResult, BucketAggregate, HasPnl, InsightData, InsightKind, ProcessedTradeRecord,
};
use crate::stats::aggregate::{aggregate_fixed, best_bucket, group_by, worst_bucket};
use crate::stats::calculate_win_rate;

/// Win-rate gap between first trades and later trades worth calling out.
const WIN_RATE_GAP: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SequencePosition {
    #[serde(rename = "1st Trade")]
    First,
    #[serde(rename = "2nd-3rd Trade")]
    SecondThird,
    #[serde(rename = "4th-5th Trade")]
    FourthFifth,
    #[serde(rename = "6th+ Trade")]
    SixthPlus,
}

impl SequencePosition {
    pub const ALL: [SequencePosition; 4] = [
        SequencePosition::First,
        SequencePosition::SecondThird,
        SequencePosition::FourthFifth,
        SequencePosition::SixthPlus,
    ];

    /// `ordinal` is 1-based.
    pub fn from_ordinal(ordinal: usize) -> Self {
        match ordinal {
            0 | 1 => SequencePosition::First,
            2 | 3 => SequencePosition::SecondThird,
            4 | 5 => SequencePosition::FourthFifth,
            _ => SequencePosition::SixthPlus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SequencePosition::First => "1st Trade",
            SequencePosition::SecondThird => "2nd-3rd Trade",
            SequencePosition::FourthFifth => "4th-5th Trade",
            SequencePosition::SixthPlus => "6th+ Trade",
        }
    }
}

impl fmt::Display for SequencePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSummary {
    pub best_position: BucketAggregate,
    pub worst_position: BucketAggregate,
    pub first_trade_win_rate: f64,
    pub later_trades_win_rate: f64,
    /// Trades taken directly after a losing trade on the same day.
    pub post_loss_trades: usize,
    pub post_loss_win_rate: f64,
    pub post_loss_pnl: f64,
    pub overall_win_rate: f64,
    pub max_trades_in_day: usize,
}

pub type TradeSequenceAnalysis = InsightData<BucketAggregate, SequenceSummary>;

struct Sequenced<'a> {
    trade: &'a ProcessedTradeRecord,
    position: SequencePosition,
    after_loss: bool,
}

impl HasPnl for Sequenced<'_> {
    fn pnl(&self) -> f64 {
        self.trade.pnl
    }
}

pub fn analyze_trade_sequence(
    trades: &[ProcessedTradeRecord],
) -> AnalysisResult<TradeSequenceAnalysis> {
    into_result(InsightKind::TradeSequence, trades.len(), build(trades))
}

/// Numbers each day's trades. Days where every trade has a recorded entry
/// time are ordered by that time; otherwise input order stands.
fn sequence(trades: &[ProcessedTradeRecord]) -> (Vec<Sequenced<'_>>, usize) {
    let mut out = Vec::with_capacity(trades.len());
    let mut max_in_day = 0;

    for (_, mut day) in group_by(trades, |t| Some(t.date)) {
        if day.iter().all(|t| t.time_recorded) {
            day.sort_by_key(|t| t.entry_time);
        }
        max_in_day = max_in_day.max(day.len());

        let mut previous_loss = false;
        for (i, trade) in day.into_iter().enumerate() {
            out.push(Sequenced {
                trade,
                position: SequencePosition::from_ordinal(i + 1),
                after_loss: previous_loss,
            });
            previous_loss = trade.is_loss;
        }
    }
    (out, max_in_day)
}

fn build(trades: &[ProcessedTradeRecord]) -> Result<(TradeSequenceAnalysis, usize), AnalysisError> {
    if trades.is_empty() {
        return Err(AnalysisError::NoTrades);
    }

    let (sequenced, max_in_day) = sequence(trades);
    let table = aggregate_fixed(
        &sequenced,
        &SequencePosition::ALL,
        |s| Some(s.position),
        |p| p.label().to_string(),
    );

    let (best, worst) = match (best_bucket(&table), worst_bucket(&table)) {
        (Some(b), Some(w)) => (b.clone(), w.clone()),
        _ => return Err(AnalysisError::NoTrades),
    };

    let (first, later): (Vec<&Sequenced>, Vec<&Sequenced>) = sequenced
        .iter()
        .partition(|s| s.position == SequencePosition::First);
    let post_loss: Vec<&Sequenced> = sequenced.iter().filter(|s| s.after_loss).collect();

    let summary = SequenceSummary {
        best_position: best,
        worst_position: worst,
        first_trade_win_rate: calculate_win_rate(&first),
        later_trades_win_rate: calculate_win_rate(&later),
        post_loss_trades: post_loss.len(),
        post_loss_win_rate: calculate_win_rate(&post_loss),
        post_loss_pnl: post_loss.iter().map(|s| s.pnl()).sum(),
        overall_win_rate: calculate_win_rate(&sequenced),
        max_trades_in_day: max_in_day,
    };

    let has_later = !later.is_empty();
    let insights = generate_insights(&summary, has_later);
    let recommendations = generate_recommendations(&summary, has_later);

    Ok((
        InsightData {
            table,
            summary,
            insights,
            recommendations,
        },
        trades.len(),
    ))
}

fn generate_insights(summary: &SequenceSummary, has_later: bool) -> Vec<String> {
    let mut out = Vec::new();
    let best = &summary.best_position;

    if best.total_pnl > 0.0 {
        out.push(format!(
            "Your {} of the day performs best: {} across {} trades.",
            best.bucket.to_lowercase(),
            inr(best.total_pnl),
            best.trade_count
        ));
    }
    if summary.worst_position.total_pnl < 0.0 {
        out.push(format!(
            "The {} position loses the most: {}.",
            summary.worst_position.bucket,
            inr(summary.worst_position.total_pnl)
        ));
    }
    if has_later {
        let gap = summary.first_trade_win_rate - summary.later_trades_win_rate;
        if gap >= WIN_RATE_GAP {
            out.push(format!(
                "Performance fades as the day goes on: first trades win {} vs {} later.",
                pct(summary.first_trade_win_rate),
                pct(summary.later_trades_win_rate)
            ));
        } else if gap <= -WIN_RATE_GAP {
            out.push(format!(
                "You improve after the first trade: later trades win {} vs {} first.",
                pct(summary.later_trades_win_rate),
                pct(summary.first_trade_win_rate)
            ));
        }
    }
    if summary.post_loss_trades > 0 {
        out.push(format!(
            "After a loss, your next trade wins {} of the time ({} trades, net {}).",
            pct(summary.post_loss_win_rate),
            summary.post_loss_trades,
            inr(summary.post_loss_pnl)
        ));
    }
    out
}

fn generate_recommendations(summary: &SequenceSummary, has_later: bool) -> Vec<String> {
    let mut out = Vec::new();
    if has_later && summary.first_trade_win_rate - summary.later_trades_win_rate >= WIN_RATE_GAP {
        out.push("Consider stopping after your first few trades while your edge is freshest.".to_string());
    }
    if summary.post_loss_trades > 0 && summary.post_loss_win_rate < summary.overall_win_rate {
        out.push(
            "Take a short break after a losing trade to avoid revenge trading.".to_string(),
        );
    }
    if summary.worst_position.total_pnl < 0.0 {
        out.push(format!(
            "Be extra selective with your {} of the day.",
            summary.worst_position.bucket.to_lowercase()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TradeBuilder;

    #[test]
    fn ordinals_map_to_positions() {
        assert_eq!(SequencePosition::from_ordinal(1), SequencePosition::First);
        assert_eq!(SequencePosition::from_ordinal(3), SequencePosition::SecondThird);
        assert_eq!(SequencePosition::from_ordinal(5), SequencePosition::FourthFifth);
        assert_eq!(SequencePosition::from_ordinal(12), SequencePosition::SixthPlus);
    }

    #[test]
    fn day_is_ordered_by_entry_time() {
        // input order is reversed relative to the clock
        let trades = vec![
            TradeBuilder::new("2025-01-13", -40.0).at(11, 0).build(),
            TradeBuilder::new("2025-01-13", 100.0).at(9, 20).build(),
        ];
        let data = analyze_trade_sequence(&trades).data.unwrap();
        assert_eq!(data.table[0].bucket, "1st Trade");
        assert_eq!(data.table[0].total_pnl, 100.0);
        assert_eq!(data.table[1].bucket, "2nd-3rd Trade");
        assert_eq!(data.table[1].total_pnl, -40.0);
    }

    #[test]
    fn untimed_day_keeps_input_order() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", -40.0).untimed().build(),
            TradeBuilder::new("2025-01-13", 100.0).at(9, 20).build(),
        ];
        let data = analyze_trade_sequence(&trades).data.unwrap();
        assert_eq!(data.table[0].total_pnl, -40.0);
    }

    #[test]
    fn post_loss_trades_are_tracked() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", -50.0).at(9, 20).build(),
            TradeBuilder::new("2025-01-13", -30.0).at(9, 40).build(),
            TradeBuilder::new("2025-01-13", -20.0).at(10, 0).build(),
            TradeBuilder::new("2025-01-14", 60.0).at(9, 20).build(),
        ];
        let data = analyze_trade_sequence(&trades).data.unwrap();
        assert_eq!(data.summary.post_loss_trades, 2);
        assert_eq!(data.summary.post_loss_win_rate, 0.0);
        assert_eq!(data.summary.post_loss_pnl, -50.0);
        assert_eq!(data.summary.overall_win_rate, 25.0);
        assert_eq!(data.summary.first_trade_win_rate, 50.0);
        assert_eq!(data.summary.max_trades_in_day, 3);
        assert!(data
            .recommendations
            .iter()
            .any(|r| r.contains("revenge trading")));
    }

    #[test]
    fn only_first_trades_yields_one_row() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", 10.0).build(),
            TradeBuilder::new("2025-01-14", 20.0).build(),
        ];
        let data = analyze_trade_sequence(&trades).data.unwrap();
        assert_eq!(data.table.len(), 1);
        assert_eq!(data.table[0].trade_count, 2);
    }
}
