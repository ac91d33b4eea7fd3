//! Technical indicators computed from a price series.
//!
//! - `rsi`: simple-average RSI with an epsilon-guarded loss denominator
//! - `ema`: span-based exponential moving average seeded by the first value
//! - `macd`: MACD line, signal line and histogram built on `ema`
//! - `volume`: current volume relative to its trailing average
//!
//! Every function degrades to a documented neutral value instead of failing
//! when history is too short.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod volume;

pub use ema::ema_series;
pub use macd::{calculate_macd, MacdValue};
pub use rsi::calculate_rsi;
pub use volume::volume_ratio;

use crate::domain::price_bar::PriceSeries;
use serde::Serialize;
use std::fmt;

pub const RSI_PERIOD: usize = 14;
/// Reported when the series is too short for an RSI value.
pub const RSI_NEUTRAL: f64 = 50.0;
/// Added to the average loss before dividing.
pub const RSI_EPSILON: f64 = 1e-9;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

pub const VOLUME_WINDOW: usize = 20;
/// Reported when the trailing volume average is zero or undefined.
pub const VOLUME_RATIO_NEUTRAL: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub volume_ratio: f64,
}

impl fmt::Display for IndicatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RSI({})={:.2} MACD({},{},{})={:.4}/{:.4}/{:.4} VOLR({})={:.2}",
            RSI_PERIOD,
            self.rsi,
            MACD_FAST,
            MACD_SLOW,
            MACD_SIGNAL,
            self.macd,
            self.macd_signal,
            self.macd_histogram,
            VOLUME_WINDOW,
            self.volume_ratio
        )
    }
}

pub fn compute_indicators(series: &PriceSeries) -> IndicatorSnapshot {
    let closes = series.closes();
    let volumes = series.volumes();
    let macd = calculate_macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

    IndicatorSnapshot {
        rsi: calculate_rsi(&closes, RSI_PERIOD),
        macd: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        volume_ratio: volume_ratio(&volumes, VOLUME_WINDOW),
    }
}
