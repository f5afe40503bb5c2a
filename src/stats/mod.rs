pub mod aggregate;
pub mod calculations;
pub mod trading;

pub use calculations::{
    calculate_basic_stats, calculate_correlation, calculate_moving_average,
    calculate_percentile, find_outliers, BasicStats, Outliers,
};
pub use trading::{
    calculate_expectancy, calculate_max_drawdown, calculate_profit_factor,
    calculate_profit_loss_ratio, calculate_risk_reward_ratio, calculate_sharpe_ratio,
    calculate_win_rate,
};
