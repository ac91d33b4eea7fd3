//! Exponential Moving Average.
//!
//! alpha = 2/(span+1), seeded with the first value, then
//! EMA[i] = x[i]*alpha + EMA[i-1]*(1-alpha). No warmup bars and no bias
//! adjustment, so the output has the same length as the input.

pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &v in &values[1..] {
        ema = v * alpha + ema * (1.0 - alpha);
        out.push(ema);
    }

    out
}
