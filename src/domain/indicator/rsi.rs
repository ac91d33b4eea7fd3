//! RSI (Relative Strength Index).
//!
//! Gains and losses are the positive and negated negative bar-to-bar close
//! deltas. Each is averaged with a simple mean over the last `period` deltas:
//!
//! RS = avg_gain / (avg_loss + RSI_EPSILON)
//! RSI = 100 - 100 / (1 + RS)
//!
//! Needs `period + 1` closes; shorter input returns `RSI_NEUTRAL`. A flat
//! window has zero gains and so reads 0, not 50.

use crate::domain::indicator::{RSI_EPSILON, RSI_NEUTRAL};

pub fn calculate_rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let window = &closes[closes.len() - period - 1..];
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for w in window.windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gain_sum += change;
        } else if change < 0.0 {
            loss_sum -= change;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;
    let rs = avg_gain / (avg_loss + RSI_EPSILON);
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rsi_empty() {
        assert_eq!(calculate_rsi(&[], 14), RSI_NEUTRAL);
    }

    #[test]
    fn rsi_one_short_of_period_is_neutral() {
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_eq!(calculate_rsi(&closes, 14), RSI_NEUTRAL);
    }

    #[test]
    fn rsi_first_valid_length() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + (i % 3) as f64).collect();
        assert_ne!(calculate_rsi(&closes, 14), RSI_NEUTRAL);
    }

    #[test]
    fn rsi_all_gains_approaches_100() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        // avg_gain = 1, avg_loss = 0 -> RS = 1e9
        let expected = 100.0 - 100.0 / (1.0 + 1.0 / RSI_EPSILON);
        assert!((rsi - expected).abs() < 1e-9);
        assert!(rsi < 100.0);
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi.abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_window_is_zero() {
        let closes = vec![50.0; 20];
        assert!(calculate_rsi(&closes, 14).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_uses_only_trailing_window() {
        // a huge early drop falls outside the last 14 deltas
        let mut closes = vec![1000.0, 10.0];
        closes.extend((0..14).map(|i| 10.0 + i as f64 + 1.0));
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi > 99.0);
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        // gains: .25 .25 .75 .5 .5 .25 .25 .5 .25 .5 = 4.0; losses: .75 .25 .25 .25 = 1.5
        let rs = (4.0 / 14.0) / (1.5 / 14.0 + RSI_EPSILON);
        let expected = 100.0 - 100.0 / (1.0 + rs);
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi - expected).abs() < 1e-9);
        assert!(rsi > 70.0 && rsi < 75.0);
    }

    #[test]
    fn rsi_zero_period() {
        assert_eq!(calculate_rsi(&[1.0, 2.0, 3.0], 0), RSI_NEUTRAL);
    }

    proptest! {
        #[test]
        fn rsi_always_in_range(closes in prop::collection::vec(0.01f64..10_000.0, 0..120)) {
            let rsi = calculate_rsi(&closes, 14);
            prop_assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
        }

        #[test]
        fn rsi_short_series_is_neutral(closes in prop::collection::vec(0.01f64..10_000.0, 0..15)) {
            prop_assert_eq!(calculate_rsi(&closes, 14), RSI_NEUTRAL);
        }
    }
}
