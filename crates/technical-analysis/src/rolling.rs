//! Window primitives shared by the indicators.
//!
//! Every function returns a vector the same length as its input. A position
//! whose trailing window is incomplete, or contains an undefined value, is `NaN`.

use statrs::statistics::Statistics;

/// Apply `f` to each complete trailing window of `period` values.
fn rolling_apply(data: &[f64], period: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut result = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    for i in period - 1..data.len() {
        let window = &data[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(window);
    }
    result
}

pub fn rolling_mean(data: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(data, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

pub fn rolling_sum(data: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(data, period, |w| w.iter().sum::<f64>())
}

/// Sample standard deviation (n - 1 denominator); a single-value window is `NaN`.
pub fn rolling_std(data: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(data, period, |w| w.std_dev())
}

pub fn rolling_max(data: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(data, period, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(data: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(data, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Mean absolute deviation around the window mean.
pub fn rolling_mean_abs_dev(data: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(data, period, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        w.iter().map(|x| (x - mean).abs()).sum::<f64>() / w.len() as f64
    })
}

/// Smoothing factor for a span-parameterised EMA.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Adjusted exponentially weighted mean.
///
/// Each output is `sum((1-a)^k * x[t-k]) / sum((1-a)^k)` over the observed
/// points so far, so the first defined value is the first observation itself
/// rather than a simple-average seed. `NaN` inputs are not observations: the
/// previous output is carried forward and older weights keep decaying.
pub fn ewm_mean(data: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = vec![f64::NAN; data.len()];
    let decay = 1.0 - alpha;
    let mut weighted = f64::NAN;
    let mut old_wt = 1.0;

    for (i, &cur) in data.iter().enumerate() {
        let is_observation = !cur.is_nan();
        if weighted.is_nan() {
            if is_observation {
                weighted = cur;
                old_wt = 1.0;
            }
        } else {
            old_wt *= decay;
            if is_observation {
                // constant input must stay exactly constant
                if weighted != cur {
                    weighted = (old_wt * weighted + cur) / (old_wt + 1.0);
                }
                old_wt += 1.0;
            }
        }
        result[i] = weighted;
    }
    result
}

/// `data[i] - data[i - 1]`; the first element is `NaN`.
pub fn diff(data: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; data.len()];
    for i in 1..data.len() {
        result[i] = data[i] - data[i - 1];
    }
    result
}

/// Value `periods` bars earlier; leading positions are `NaN`.
pub fn shift(data: &[f64], periods: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; data.len()];
    for i in periods..data.len() {
        result[i] = data[i - periods];
    }
    result
}

/// max(high - low, |high - prev close|, |low - prev close|); undefined on the first bar.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; close.len()];
    for i in 1..close.len() {
        let high_low = high[i] - low[i];
        let high_close = (high[i] - close[i - 1]).abs();
        let low_close = (low[i] - close[i - 1]).abs();
        result[i] = high_low.max(high_close).max(low_close);
    }
    result
}

/// (high + low + close) / 3
pub fn typical_price(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    high.iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean_pads_with_nan() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(result.len(), 4);
        assert!(result[0].is_nan() && result[1].is_nan());
        assert!((result[2] - 2.0).abs() < 1e-12);
        assert!((result[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_longer_than_data_is_all_nan() {
        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
        assert!(rolling_std(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let result = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // population std of this set is 2.0; sample std is sqrt(32/7)
        assert!((result[7] - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_nan_inside_window_poisons_window() {
        let result = rolling_sum(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert!((result[3] - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_ewm_mean_adjusted_startup() {
        // alpha = 0.5: second value = (0.5 * 1 + 2) / 1.5
        let result = ewm_mean(&[1.0, 2.0, 3.0], 0.5);
        assert!((result[0] - 1.0).abs() < 1e-12);
        assert!((result[1] - 2.5 / 1.5).abs() < 1e-12);
        let expected = (0.25 * 1.0 + 0.5 * 2.0 + 3.0) / 1.75;
        assert!((result[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ewm_mean_skips_leading_and_inner_nan() {
        let result = ewm_mean(&[f64::NAN, 4.0, f64::NAN, 1.0], 0.5);
        assert!(result[0].is_nan());
        assert_eq!(result[1], 4.0);
        assert_eq!(result[2], 4.0);
        // weight of 4.0 decayed twice: 0.25
        assert!((result[3] - (0.25 * 4.0 + 1.0) / 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_true_range_first_bar_undefined() {
        let tr = true_range(&[10.0, 12.0], &[9.0, 10.5], &[9.5, 11.0]);
        assert!(tr[0].is_nan());
        assert!((tr[1] - 2.5).abs() < 1e-12);
    }
}
