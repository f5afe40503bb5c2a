use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::insights::format::{inr, pct};
use crate::insights::into_result;
use crate::models::{
    base_symbol, AnalysisResult, BucketAggregate, Direction, InsightData, InsightKind, OptionType,
    ProcessedTradeRecord,
};
use crate::stats::aggregate::{compute_bucket, group_by};

/// One side must out-earn the other by this share of their combined
/// magnitude to count as a specialization.
const SPECIALIZATION_SHARE: f64 = 0.5;
/// Trade share above which one side is considered the habitual bias.
const BIAS_SHARE: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionSymbolRow {
    pub side: Direction,
    pub symbol: String,
    #[serde(flatten)]
    pub stats: BucketAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRow {
    pub option_type: OptionType,
    pub base_instrument: String,
    #[serde(flatten)]
    pub stats: BucketAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionSummary {
    pub long: Option<BucketAggregate>,
    pub short: Option<BucketAggregate>,
    /// Percentage of trades taken long.
    pub long_trade_share: f64,
    /// Side with the higher total P&L, when both were traded.
    pub preferred_direction: Option<Direction>,
    /// Long total minus short total.
    pub pnl_gap: f64,
    pub call_pnl: f64,
    pub put_pnl: f64,
    pub option_trades: usize,
    pub top_profitable: Vec<DirectionSymbolRow>,
    pub top_losing: Vec<DirectionSymbolRow>,
    pub options: Vec<OptionRow>,
}

pub type DirectionAnalysis = InsightData<DirectionSymbolRow, DirectionSummary>;

/// Long/short performance per symbol plus a call/put breakdown of option
/// trades. `top_n` bounds the best and worst symbol lists.
pub fn analyze_trade_direction(
    trades: &[ProcessedTradeRecord],
    top_n: usize,
) -> AnalysisResult<DirectionAnalysis> {
    into_result(InsightKind::Direction, trades.len(), build(trades, top_n))
}

/// The side that clearly dominates P&L, if any. Requires both sides to
/// have been traded.
pub fn direction_specialization(summary: &DirectionSummary) -> Option<Direction> {
    let (long, short) = (summary.long.as_ref()?, summary.short.as_ref()?);
    let magnitude = long.total_pnl.abs() + short.total_pnl.abs();
    if magnitude == 0.0 {
        return None;
    }
    let gap = long.total_pnl - short.total_pnl;
    if gap.abs() <= SPECIALIZATION_SHARE * magnitude {
        return None;
    }
    Some(if gap > 0.0 {
        Direction::Long
    } else {
        Direction::Short
    })
}

fn build(
    trades: &[ProcessedTradeRecord],
    top_n: usize,
) -> Result<(DirectionAnalysis, usize), AnalysisError> {
    if trades.is_empty() {
        return Err(AnalysisError::NoTrades);
    }

    let table: Vec<DirectionSymbolRow> = group_by(trades, |t| Some((t.side, t.symbol.clone())))
        .into_iter()
        .map(|((side, symbol), members)| DirectionSymbolRow {
            stats: compute_bucket(format!("{} {}", side, symbol), &members),
            side,
            symbol,
        })
        .collect();

    let side_stats = |side: Direction| {
        let members: Vec<&ProcessedTradeRecord> =
            trades.iter().filter(|t| t.side == side).collect();
        (!members.is_empty()).then(|| compute_bucket(side.as_str(), &members))
    };
    let long = side_stats(Direction::Long);
    let short = side_stats(Direction::Short);

    let options: Vec<OptionRow> = group_by(trades, |t| {
        OptionType::from_symbol(&t.symbol).map(|o| (o, base_symbol(&t.symbol)))
    })
    .into_iter()
    .map(|((option_type, base), members)| OptionRow {
        stats: compute_bucket(format!("{} {}", base, option_type), &members),
        option_type,
        base_instrument: base,
    })
    .collect();

    let option_pnl = |kind: OptionType| -> f64 {
        options
            .iter()
            .filter(|o| o.option_type == kind)
            .map(|o| o.stats.total_pnl)
            .sum()
    };

    let mut ranked = table.clone();
    ranked.sort_by(|a, b| b.stats.total_pnl.total_cmp(&a.stats.total_pnl));
    let top_profitable: Vec<DirectionSymbolRow> = ranked
        .iter()
        .filter(|r| r.stats.total_pnl > 0.0)
        .take(top_n)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| a.stats.total_pnl.total_cmp(&b.stats.total_pnl));
    let top_losing: Vec<DirectionSymbolRow> = ranked
        .iter()
        .filter(|r| r.stats.total_pnl < 0.0)
        .take(top_n)
        .cloned()
        .collect();

    let long_pnl = long.as_ref().map_or(0.0, |b| b.total_pnl);
    let short_pnl = short.as_ref().map_or(0.0, |b| b.total_pnl);
    let long_count = long.as_ref().map_or(0, |b| b.trade_count);
    let preferred_direction = match (&long, &short) {
        (Some(_), Some(_)) if long_pnl >= short_pnl => Some(Direction::Long),
        (Some(_), Some(_)) => Some(Direction::Short),
        _ => None,
    };

    let summary = DirectionSummary {
        long_trade_share: long_count as f64 / trades.len() as f64 * 100.0,
        preferred_direction,
        pnl_gap: long_pnl - short_pnl,
        call_pnl: option_pnl(OptionType::CE),
        put_pnl: option_pnl(OptionType::PE),
        option_trades: options.iter().map(|o| o.stats.trade_count).sum(),
        long,
        short,
        top_profitable,
        top_losing,
        options,
    };

    let insights = generate_insights(&summary);
    let recommendations = generate_recommendations(&summary);

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

fn generate_insights(summary: &DirectionSummary) -> Vec<String> {
    let mut out = Vec::new();

    for side in [&summary.long, &summary.short].into_iter().flatten() {
        out.push(format!(
            "{} trades: {} across {} trades ({} win rate).",
            side.bucket,
            inr(side.total_pnl),
            side.trade_count,
            pct(side.win_rate)
        ));
    }

    if let Some(dir) = direction_specialization(summary) {
        out.push(format!(
            "You are markedly better trading {}: the P&L gap between sides is {}.",
            dir,
            inr(summary.pnl_gap.abs())
        ));
    }
    if summary.long_trade_share >= BIAS_SHARE {
        out.push(format!(
            "Strong long bias: {} of trades are long.",
            pct(summary.long_trade_share)
        ));
    } else if summary.long_trade_share <= 100.0 - BIAS_SHARE {
        out.push(format!(
            "Strong short bias: {} of trades are short.",
            pct(100.0 - summary.long_trade_share)
        ));
    }

    if let Some(top) = summary.top_profitable.first() {
        out.push(format!(
            "Most profitable: {} {} with {}.",
            top.side,
            top.symbol,
            inr(top.stats.total_pnl)
        ));
    }
    if let Some(bottom) = summary.top_losing.first() {
        out.push(format!(
            "Biggest drain: {} {} with {}.",
            bottom.side,
            bottom.symbol,
            inr(bottom.stats.total_pnl)
        ));
    }

    if summary.option_trades > 0 {
        out.push(format!(
            "Options: calls netted {}, puts netted {} over {} trades.",
            inr(summary.call_pnl),
            inr(summary.put_pnl),
            summary.option_trades
        ));
    }
    out
}

fn generate_recommendations(summary: &DirectionSummary) -> Vec<String> {
    let mut out = Vec::new();
    match direction_specialization(summary) {
        Some(dir) => out.push(format!(
            "Lean into {} setups and tighten criteria for {} trades.",
            dir.as_str().to_lowercase(),
            dir.opposite().as_str().to_lowercase()
        )),
        None if summary.long.is_none() || summary.short.is_none() => out.push(
            "You trade one side only; practice the other direction on small size to adapt to falling and rising markets.".to_string(),
        ),
        None => {}
    }
    if let Some(bottom) = summary.top_losing.first() {
        out.push(format!(
            "Review or drop {} {} trades.",
            bottom.side.as_str().to_lowercase(),
            bottom.symbol
        ));
    }
    if summary.option_trades > 0 {
        if summary.call_pnl < 0.0 && summary.put_pnl > 0.0 {
            out.push("Puts are working and calls are not; be more selective buying calls.".to_string());
        } else if summary.put_pnl < 0.0 && summary.call_pnl > 0.0 {
            out.push("Calls are working and puts are not; be more selective buying puts.".to_string());
        }
    }
    out
}
