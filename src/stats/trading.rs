use crate::models::HasPnl;
use crate::stats::calculations::calculate_basic_stats;

/// Percentage of trades with a positive P&L. Independent of trade order.
pub fn calculate_win_rate<T: HasPnl>(trades: &[T]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.pnl() > 0.0).count();
    wins as f64 / trades.len() as f64 * 100.0
}

fn average_win_loss<T: HasPnl>(trades: &[T]) -> (f64, f64, usize, usize) {
    let mut win_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut wins = 0;
    let mut losses = 0;
    for t in trades {
        let pnl = t.pnl();
        if pnl > 0.0 {
            win_sum += pnl;
            wins += 1;
        } else if pnl < 0.0 {
            loss_sum += pnl;
            losses += 1;
        }
    }
    let avg_win = if wins > 0 { win_sum / wins as f64 } else { 0.0 };
    let avg_loss = if losses > 0 {
        (loss_sum / losses as f64).abs()
    } else {
        0.0
    };
    (avg_win, avg_loss, wins, losses)
}

/// Average win over average absolute loss. Unlike the profit factor this
/// reports infinity when there are wins and no losses.
pub fn calculate_profit_loss_ratio<T: HasPnl>(trades: &[T]) -> f64 {
    let (avg_win, avg_loss, wins, losses) = average_win_loss(trades);
    match (wins, losses) {
        (0, _) => 0.0,
        (_, 0) => f64::INFINITY,
        _ => avg_win / avg_loss,
    }
}

/// Average win over average absolute loss; 0 when there are no losses.
pub fn calculate_profit_factor<T: HasPnl>(trades: &[T]) -> f64 {
    let (avg_win, avg_loss, _, _) = average_win_loss(trades);
    if avg_loss > 0.0 {
        avg_win / avg_loss
    } else {
        0.0
    }
}

/// Reward earned per unit of risk taken, from average win and average loss
/// sizes. 0 unless both sides are present.
pub fn calculate_risk_reward_ratio(avg_win: f64, avg_loss: f64) -> f64 {
    let risk = avg_loss.abs();
    if risk == 0.0 || avg_win <= 0.0 {
        0.0
    } else {
        avg_win / risk
    }
}

/// Mean excess return over its standard deviation. Not annualized.
pub fn calculate_sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let stats = calculate_basic_stats(returns);
    if stats.count < 2 || stats.std_dev == 0.0 {
        return 0.0;
    }
    (stats.mean - risk_free_rate) / stats.std_dev
}

/// Expected P&L per trade: win rate times average win minus loss rate times
/// average loss.
pub fn calculate_expectancy<T: HasPnl>(trades: &[T]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let (avg_win, avg_loss, wins, losses) = average_win_loss(trades);
    let n = trades.len() as f64;
    (wins as f64 / n) * avg_win - (losses as f64 / n) * avg_loss
}

/// Largest peak-to-trough fall of the cumulative P&L curve, as a positive
/// amount. The curve starts at zero.
pub fn calculate_max_drawdown(pnls: &[f64]) -> f64 {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for pnl in pnls {
        equity += pnl;
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_is_order_independent() {
        let a = [100.0, -50.0, 20.0, 0.0];
        let b = [0.0, 20.0, -50.0, 100.0];
        assert_eq!(calculate_win_rate(&a), 50.0);
        assert_eq!(calculate_win_rate(&a), calculate_win_rate(&b));
        assert_eq!(calculate_win_rate::<f64>(&[]), 0.0);
    }

    #[test]
    fn profit_loss_ratio_is_infinite_without_losses() {
        assert_eq!(calculate_profit_loss_ratio(&[10.0, 20.0]), f64::INFINITY);
        assert_eq!(calculate_profit_loss_ratio(&[-10.0]), 0.0);
        assert_eq!(calculate_profit_loss_ratio(&[30.0, -10.0]), 3.0);
    }

    #[test]
    fn profit_factor_is_zero_without_losses() {
        assert_eq!(calculate_profit_factor(&[10.0, 20.0]), 0.0);
        assert_eq!(calculate_profit_factor(&[20.0, 40.0, -10.0, -30.0]), 1.5);
    }

    #[test]
    fn risk_reward_needs_both_sides() {
        assert_eq!(calculate_risk_reward_ratio(300.0, -100.0), 3.0);
        assert_eq!(calculate_risk_reward_ratio(300.0, 0.0), 0.0);
        assert_eq!(calculate_risk_reward_ratio(0.0, -100.0), 0.0);
    }

    #[test]
    fn sharpe_zero_for_flat_returns() {
        assert_eq!(calculate_sharpe_ratio(&[1.0, 1.0, 1.0], 0.0), 0.0);
        let s = calculate_sharpe_ratio(&[1.0, 3.0], 0.0);
        assert!((s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn expectancy_and_drawdown() {
        let pnls = [100.0, -50.0, -70.0, 200.0, -30.0];
        // wins avg 150 at 40%, losses avg 50 at 60%
        assert!((calculate_expectancy(&pnls) - 30.0).abs() < 1e-9);
        assert_eq!(calculate_max_drawdown(&pnls), 120.0);
        assert_eq!(calculate_max_drawdown(&[-10.0, -5.0]), 15.0);
        assert_eq!(calculate_max_drawdown(&[]), 0.0);
    }
}
