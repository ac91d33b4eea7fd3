//! Current volume relative to its trailing simple average.

use crate::domain::indicator::VOLUME_RATIO_NEUTRAL;
use crate::domain::stats::trailing_mean;

/// `VOLUME_RATIO_NEUTRAL` when fewer than `window` bars exist or the
/// average is not positive.
pub fn volume_ratio(volumes: &[f64], window: usize) -> f64 {
    let Some(current) = volumes.last() else {
        return VOLUME_RATIO_NEUTRAL;
    };
    match trailing_mean(volumes, window) {
        Some(avg) if avg > 0.0 => current / avg,
        _ => VOLUME_RATIO_NEUTRAL,
    }
}
