//! Cross-sectional anomaly scan for the latest trading session.
//!
//! For every symbol that traded on the most recent date in the dataset, the
//! latest volume and the latest close-to-close return are scored against the
//! symbol's whole history (sample mean and standard deviation). Scores past
//! `Z_SCORE_THRESHOLD` are flagged. Nothing is cached between scans.

use crate::domain::price_bar::{MarketDataset, PriceSeries};
use crate::domain::stats::{mean, pct_change, sample_std};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const Z_SCORE_THRESHOLD: f64 = 3.0;
/// Standard deviations at or below this are treated as no dispersion.
pub const MIN_DISPERSION: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyReason {
    #[serde(rename = "Volume Spike")]
    VolumeSpike,
    #[serde(rename = "Abnormal Price Drop")]
    AbnormalPriceDrop,
    #[serde(rename = "Abnormal Price Jump")]
    AbnormalPriceJump,
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyReason::VolumeSpike => write!(f, "Volume Spike"),
            AnomalyReason::AbnormalPriceDrop => write!(f, "Abnormal Price Drop"),
            AnomalyReason::AbnormalPriceJump => write!(f, "Abnormal Price Jump"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub reason: AnomalyReason,
    pub detail: String,
    pub severity: Severity,
}

/// Scans the latest session. Records are ordered by symbol, with the volume
/// record before the return record for the same symbol.
pub fn scan_anomalies(dataset: &MarketDataset) -> Vec<AnomalyRecord> {
    let Some(latest_date) = dataset.latest_date() else {
        return Vec::new();
    };

    let mut anomalies = Vec::new();
    for series in dataset.per_symbol().values() {
        match series.last() {
            Some(bar) if bar.date == latest_date => {}
            _ => continue,
        }
        scan_symbol(series, latest_date, &mut anomalies);
    }

    log::debug!(
        "anomaly scan for {}: {} records",
        latest_date,
        anomalies.len()
    );
    anomalies
}

fn z_score(latest: f64, history: &[f64]) -> Option<f64> {
    let m = mean(history)?;
    let std = sample_std(history)?;
    if !std.is_finite() || std <= MIN_DISPERSION {
        return None;
    }
    Some((latest - m) / std)
}

fn scan_symbol(series: &PriceSeries, date: NaiveDate, out: &mut Vec<AnomalyRecord>) {
    let symbol = series.symbol();
    let Some(latest) = series.last() else {
        return;
    };

    let volumes = series.volumes();
    match z_score(latest.volume, &volumes) {
        Some(z) if z > Z_SCORE_THRESHOLD => out.push(AnomalyRecord {
            symbol: symbol.to_string(),
            date,
            reason: AnomalyReason::VolumeSpike,
            detail: format!(
                "Volume {} is {:.1}x std dev above mean",
                group_thousands(latest.volume),
                z
            ),
            severity: Severity::High,
        }),
        Some(_) => {}
        None => log::debug!("{}: no volume dispersion, skipping volume check", symbol),
    }

    let returns = pct_change(&series.closes());
    let Some(&latest_return) = returns.last() else {
        return;
    };
    if !latest_return.is_finite() {
        log::debug!("{}: latest return undefined, skipping return check", symbol);
        return;
    }
    let history: Vec<f64> = returns.into_iter().filter(|r| r.is_finite()).collect();

    match z_score(latest_return, &history) {
        Some(z) if z < -Z_SCORE_THRESHOLD => out.push(AnomalyRecord {
            symbol: symbol.to_string(),
            date,
            reason: AnomalyReason::AbnormalPriceDrop,
            detail: format!(
                "Return {:.2}% is {:.1}x std dev below mean",
                latest_return * 100.0,
                z
            ),
            severity: Severity::High,
        }),
        Some(z) if z > Z_SCORE_THRESHOLD => out.push(AnomalyRecord {
            symbol: symbol.to_string(),
            date,
            reason: AnomalyReason::AbnormalPriceJump,
            detail: format!(
                "Return {:.2}% is {:.1}x std dev above mean",
                latest_return * 100.0,
                z
            ),
            severity: Severity::Medium,
        }),
        _ => {}
    }
}

/// `1234567.0` -> `"1,234,567"`.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}
