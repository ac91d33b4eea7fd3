//! Small numeric helpers shared by the indicator, forecast and anomaly code.
//!
//! Dispersion is the sample standard deviation (n - 1 denominator), which is
//! what the anomaly z-scores are calibrated against.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation; `None` with fewer than two observations.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Mean of the trailing `window` values; `None` until the window is full.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    mean(&values[values.len() - window..])
}

/// Bar-to-bar fractional change. A zero previous value yields a non-finite
/// entry, left for callers to filter.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    (sse / actual.len() as f64).sqrt()
}

pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sae: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    sae / actual.len() as f64
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_empty_is_none() {
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn sample_std_known_values() {
        // population std of this set is 2.0; sample std is sqrt(32/7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std(&values).unwrap();
        assert_relative_eq!(std, (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sample_std_single_value_is_none() {
        assert!(sample_std(&[5.0]).is_none());
    }

    #[test]
    fn sample_std_constant_is_zero() {
        assert_eq!(sample_std(&[3.0, 3.0, 3.0]), Some(0.0));
    }

    #[test]
    fn trailing_mean_needs_full_window() {
        assert!(trailing_mean(&[1.0, 2.0], 3).is_none());
        assert_eq!(trailing_mean(&[1.0, 2.0, 3.0, 4.0], 3), Some(3.0));
        assert!(trailing_mean(&[1.0], 0).is_none());
    }

    #[test]
    fn pct_change_basic() {
        let changes = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(changes.len(), 2);
        assert_relative_eq!(changes[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(changes[1], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn pct_change_from_zero_is_not_finite() {
        let changes = pct_change(&[0.0, 1.0]);
        assert!(!changes[0].is_finite());
    }

    #[test]
    fn rmse_and_mae() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [1.0, 3.0, 1.0];
        // residuals 0, -1, 2
        assert_relative_eq!(rmse(&actual, &predicted), (5.0f64 / 3.0).sqrt());
        assert_relative_eq!(mae(&actual, &predicted), 1.0);
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(2.0004, 3), 2.0);
        assert_eq!(round_to(-1.5, 0), -2.0);
    }
}
