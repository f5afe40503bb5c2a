use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{BucketAggregate, HasPnl};

/// Groups items by key, keeping groups in first-seen order and items in
/// input order within each group.
pub fn group_by<'a, T, K, F>(items: &'a [T], mut key_fn: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&T>)> = Vec::new();

    for item in items {
        let Some(key) = key_fn(item) else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

/// Aggregates over a fixed category set, emitted in `order`. Categories with
/// no trades are left out rather than reported as zero rows.
pub fn aggregate_fixed<T, K, F>(
    items: &[T],
    order: &[K],
    key_fn: F,
    label: impl Fn(&K) -> String,
) -> Vec<BucketAggregate>
where
    T: HasPnl,
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> Option<K>,
{
    let mut groups: HashMap<K, Vec<&T>> = group_by(items, key_fn).into_iter().collect();
    order
        .iter()
        .filter_map(|k| {
            let trades = groups.remove(k)?;
            Some(compute_bucket(label(k), &trades))
        })
        .collect()
}

/// Aggregates over whatever keys appear, in first-seen order.
pub fn aggregate_by<T, K, F>(
    items: &[T],
    key_fn: F,
    label: impl Fn(&K) -> String,
) -> Vec<BucketAggregate>
where
    T: HasPnl,
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> Option<K>,
{
    group_by(items, key_fn)
        .into_iter()
        .map(|(k, trades)| compute_bucket(label(&k), &trades))
        .collect()
}

pub fn compute_bucket<T: HasPnl>(bucket: impl Into<String>, trades: &[T]) -> BucketAggregate {
    let trade_count = trades.len();
    let mut total_pnl = 0.0;
    let mut win_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut winning_trades = 0;
    let mut losing_trades = 0;
    let mut best_trade = f64::NEG_INFINITY;
    let mut worst_trade = f64::INFINITY;

    for t in trades {
        let pnl = t.pnl();
        total_pnl += pnl;
        best_trade = best_trade.max(pnl);
        worst_trade = worst_trade.min(pnl);
        if pnl > 0.0 {
            winning_trades += 1;
            win_sum += pnl;
        } else if pnl < 0.0 {
            losing_trades += 1;
            loss_sum += pnl;
        }
    }

    let avg_pnl = if trade_count > 0 {
        total_pnl / trade_count as f64
    } else {
        0.0
    };
    let win_rate = if trade_count > 0 {
        winning_trades as f64 / trade_count as f64 * 100.0
    } else {
        0.0
    };
    let avg_win = if winning_trades > 0 {
        win_sum / winning_trades as f64
    } else {
        0.0
    };
    let avg_loss = if losing_trades > 0 {
        (loss_sum / losing_trades as f64).abs()
    } else {
        0.0
    };
    let profit_factor = if avg_loss > 0.0 { avg_win / avg_loss } else { 0.0 };

    BucketAggregate {
        bucket: bucket.into(),
        total_pnl,
        trade_count,
        winning_trades,
        losing_trades,
        avg_pnl,
        win_rate,
        profit_factor,
        avg_win,
        avg_loss,
        best_trade: if trade_count > 0 { best_trade } else { 0.0 },
        worst_trade: if trade_count > 0 { worst_trade } else { 0.0 },
    }
}

/// Stable sort, highest total P&L first. Ties keep their prior order.
pub fn sort_by_total_pnl_desc(rows: &mut [BucketAggregate]) {
    rows.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl));
}

/// Highest total P&L; the earliest row wins a tie.
pub fn best_bucket(rows: &[BucketAggregate]) -> Option<&BucketAggregate> {
    best_by(rows, |r| r.total_pnl)
}

/// Lowest total P&L; the earliest row wins a tie.
pub fn worst_bucket(rows: &[BucketAggregate]) -> Option<&BucketAggregate> {
    worst_by(rows, |r| r.total_pnl)
}

/// Row with the greatest metric, earliest first on ties.
pub fn best_by<R, F: Fn(&R) -> f64>(rows: &[R], metric: F) -> Option<&R> {
    rows.iter().fold(None, |best: Option<&R>, row| match best {
        Some(b) if metric(b) >= metric(row) => Some(b),
        _ => Some(row),
    })
}

/// Row with the smallest metric, earliest first on ties.
pub fn worst_by<R, F: Fn(&R) -> f64>(rows: &[R], metric: F) -> Option<&R> {
    rows.iter().fold(None, |worst: Option<&R>, row| match worst {
        Some(w) if metric(w) <= metric(row) => Some(w),
        _ => Some(row),
    })
}

pub fn total_pnl<T: HasPnl>(trades: &[T]) -> f64 {
    trades.iter().map(|t| t.pnl()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_stats_match_hand_computation() {
        let b = compute_bucket("Monday", &[300.0, -100.0, 200.0, -200.0, 0.0]);
        assert_eq!(b.bucket, "Monday");
        assert_eq!(b.trade_count, 5);
        assert_eq!(b.winning_trades, 2);
        assert_eq!(b.losing_trades, 2);
        assert_eq!(b.total_pnl, 200.0);
        assert_eq!(b.avg_pnl, 40.0);
        assert_eq!(b.win_rate, 40.0);
        assert_eq!(b.avg_win, 250.0);
        assert_eq!(b.avg_loss, 150.0);
        assert!((b.profit_factor - 250.0 / 150.0).abs() < 1e-12);
        assert_eq!(b.best_trade, 300.0);
        assert_eq!(b.worst_trade, -200.0);
    }

    #[test]
    fn profit_factor_zero_without_losses() {
        let b = compute_bucket("x", &[10.0, 20.0]);
        assert_eq!(b.profit_factor, 0.0);
        assert!(b.profit_factor.is_finite());
    }

    #[test]
    fn group_by_keeps_first_seen_order() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let groups = group_by(&values, |v| Some(*v as i64 % 2));
        assert_eq!(groups[0].0, 1);
        assert_eq!(groups[1].0, 0);
        assert_eq!(groups[0].1.len(), 3);
    }

    #[test]
    fn fixed_aggregation_omits_empty_categories() {
        let values = [5.0, -3.0, 7.0];
        let rows = aggregate_fixed(
            &values,
            &["neg", "zero", "pos"],
            |v| Some(if *v > 0.0 { "pos" } else { "neg" }),
            |k| k.to_string(),
        );
        let names: Vec<&str> = rows.iter().map(|r| r.bucket.as_str()).collect();
        assert_eq!(names, vec!["neg", "pos"]);
    }

    #[test]
    fn ties_resolve_to_first_row() {
        let rows = vec![
            compute_bucket("a", &[10.0]),
            compute_bucket("b", &[10.0]),
            compute_bucket("c", &[-5.0]),
            compute_bucket("d", &[-5.0]),
        ];
        assert_eq!(best_bucket(&rows).unwrap().bucket, "a");
        assert_eq!(worst_bucket(&rows).unwrap().bucket, "c");

        let mut sorted = rows.clone();
        sort_by_total_pnl_desc(&mut sorted);
        let names: Vec<&str> = sorted.iter().map(|r| r.bucket.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}
