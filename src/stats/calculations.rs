use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Descriptive statistics over the finite values of `values`. Variance is the
/// population variance (divisor n). Empty input, or input with no finite
/// values, yields the all-zero struct.
pub fn calculate_basic_stats(values: &[f64]) -> BasicStats {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return BasicStats::default();
    }
    finite.sort_by(f64::total_cmp);

    let n = finite.len();
    let sum: f64 = finite.iter().sum();
    let mean = sum / n as f64;
    let median = if n % 2 == 0 {
        (finite[n / 2 - 1] + finite[n / 2]) / 2.0
    } else {
        finite[n / 2]
    };
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

    BasicStats {
        count: n,
        sum,
        mean,
        median,
        min: finite[0],
        max: finite[n - 1],
        variance,
        std_dev: variance.sqrt(),
    }
}

/// Percentile `p` (0-100) with linear interpolation between the closest ranks.
pub fn calculate_percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Pearson correlation. Returns 0 when the series differ in length, have
/// fewer than two points, or either has zero variance.
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    cov / denominator
}

/// Trailing simple moving average. The output has `values.len() - window + 1`
/// points; a zero window or one longer than the series yields nothing.
pub fn calculate_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outliers {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl Outliers {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Tukey fences: anything outside [Q1 - k*IQR, Q3 + k*IQR].
pub fn find_outliers(values: &[f64], multiplier: f64) -> Outliers {
    if values.len() < 4 {
        return Outliers::default();
    }
    let q1 = calculate_percentile(values, 25.0);
    let q3 = calculate_percentile(values, 75.0);
    let iqr = q3 - q1;
    let lower_bound = q1 - multiplier * iqr;
    let upper_bound = q3 + multiplier * iqr;

    let (indices, outliers): (Vec<usize>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite() && (**v < lower_bound || **v > upper_bound))
        .map(|(i, v)| (i, *v))
        .unzip();

    Outliers {
        lower_bound,
        upper_bound,
        indices,
        values: outliers,
    }
}

pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 1.5;
