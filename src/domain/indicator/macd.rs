//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three EMAs are seeded by their first input, so a value exists from
//! the first bar; it only becomes meaningful after roughly slow + signal bars.

use crate::domain::indicator::ema_series;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// The most recent MACD triple; all zeros for empty input or a zero span.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdValue {
    if closes.is_empty() || fast == 0 || slow == 0 || signal == 0 {
        return MacdValue::default();
    }

    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_series(&macd_line, signal);

    let line = macd_line[macd_line.len() - 1];
    let signal = signal_line[signal_line.len() - 1];
    MacdValue {
        line,
        signal,
        histogram: line - signal,
    }
}
