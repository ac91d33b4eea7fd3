//! Dashboard summary of the latest session against the one before it.

use crate::domain::anomaly::{group_thousands, scan_anomalies, AnomalyRecord};
use crate::domain::price_bar::MarketDataset;
use crate::domain::stats::round_to;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const TOP_MOVERS: usize = 5;
pub const VOLUME_TREND_SESSIONS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub symbol: String,
    /// Close-to-close change in price units.
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePoint {
    pub date: NaiveDate,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketSummary {
    pub session: Option<NaiveDate>,
    pub previous_session: Option<NaiveDate>,
    /// Sum of closes over symbols trading in the session.
    pub index_value: f64,
    /// Percent, two decimals.
    pub index_change: f64,
    pub volume: f64,
    pub volume_display: String,
    pub volume_change: f64,
    pub gainers_count: usize,
    pub losers_count: usize,
    pub top_gainers: Vec<Mover>,
    /// Worst first.
    pub top_losers: Vec<Mover>,
    pub volume_trend: Vec<VolumePoint>,
    pub anomalies: Vec<AnomalyRecord>,
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

pub fn summarize_market(dataset: &MarketDataset) -> MarketSummary {
    let Some(latest) = dataset.latest_date() else {
        return MarketSummary {
            volume_display: "0".to_string(),
            ..MarketSummary::default()
        };
    };
    // A single-session dataset compares the session with itself.
    let previous = dataset.previous_date(latest).unwrap_or(latest);

    let today = dataset.bars_on(latest);
    let before = dataset.bars_on(previous);

    let index_value: f64 = today.iter().map(|b| b.close).sum();
    let prev_index: f64 = before.iter().map(|b| b.close).sum();
    let volume: f64 = today.iter().map(|b| b.volume).sum();
    let prev_volume: f64 = before.iter().map(|b| b.volume).sum();

    let prev_close: BTreeMap<&str, f64> = before
        .iter()
        .map(|b| (b.symbol.as_str(), b.close))
        .collect();
    let mut moves: Vec<Mover> = today
        .iter()
        .filter_map(|b| {
            prev_close.get(b.symbol.as_str()).map(|prev| Mover {
                symbol: b.symbol.clone(),
                change: b.close - prev,
            })
        })
        .collect();
    moves.sort_by(|a, b| b.change.partial_cmp(&a.change).unwrap_or(Ordering::Equal));

    let gainers: Vec<Mover> = moves.iter().filter(|m| m.change > 0.0).cloned().collect();
    let losers: Vec<Mover> = moves.iter().rev().filter(|m| m.change < 0.0).cloned().collect();

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for series in dataset.per_symbol().values() {
        for bar in series.bars() {
            *by_date.entry(bar.date).or_default() += bar.volume;
        }
    }
    let skip = by_date.len().saturating_sub(VOLUME_TREND_SESSIONS);
    let volume_trend = by_date
        .into_iter()
        .skip(skip)
        .map(|(date, volume)| VolumePoint { date, volume })
        .collect();

    MarketSummary {
        session: Some(latest),
        previous_session: Some(previous),
        index_value: round_to(index_value, 2),
        index_change: round_to(percent_change(index_value, prev_index), 2),
        volume,
        volume_display: group_thousands(volume),
        volume_change: round_to(percent_change(volume, prev_volume), 2),
        gainers_count: gainers.len(),
        losers_count: losers.len(),
        top_gainers: gainers.into_iter().take(TOP_MOVERS).collect(),
        top_losers: losers.into_iter().take(TOP_MOVERS).collect(),
        volume_trend,
        anomalies: scan_anomalies(dataset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_bar::PriceBar;

    fn bar(symbol: &str, day: u32, close: f64, volume: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            symbol: symbol.to_string(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn empty_dataset_is_zeroed() {
        let s = summarize_market(&MarketDataset::default());
        assert_eq!(s.index_value, 0.0);
        assert_eq!(s.volume_display, "0");
        assert!(s.session.is_none());
        assert!(s.volume_trend.is_empty());
    }

    #[test]
    fn index_and_volume_changes() {
        let ds = MarketDataset::new(vec![
            bar("A", 1, 10.0, 1000.0),
            bar("B", 1, 40.0, 1000.0),
            bar("A", 2, 11.0, 1500.0),
            bar("B", 2, 44.0, 1500.0),
        ]);
        let s = summarize_market(&ds);
        assert_eq!(s.index_value, 55.0);
        assert_eq!(s.index_change, 10.0);
        assert_eq!(s.volume, 3000.0);
        assert_eq!(s.volume_display, "3,000");
        assert_eq!(s.volume_change, 50.0);
        assert_eq!(s.gainers_count, 2);
        assert_eq!(s.losers_count, 0);
        assert_eq!(s.top_gainers[0].symbol, "B");
        assert!(s.top_losers.is_empty());
    }

    #[test]
    fn movers_ordering_and_limits() {
        let mut bars = Vec::new();
        for (i, change) in [3.0, -1.0, 2.0, -4.0, 1.0, 5.0, 0.5, -0.5, 0.0, -2.0, -3.0, -6.0]
            .iter()
            .enumerate()
        {
            let symbol = format!("S{:02}", i);
            bars.push(bar(&symbol, 1, 100.0, 10.0));
            bars.push(bar(&symbol, 2, 100.0 + change, 10.0));
        }
        let s = summarize_market(&MarketDataset::new(bars));

        assert_eq!(s.gainers_count, 5);
        assert_eq!(s.losers_count, 6);
        let gains: Vec<f64> = s.top_gainers.iter().map(|m| m.change).collect();
        assert_eq!(gains, vec![5.0, 3.0, 2.0, 1.0, 0.5]);
        let losses: Vec<f64> = s.top_losers.iter().map(|m| m.change).collect();
        assert_eq!(losses, vec![-6.0, -4.0, -3.0, -2.0, -1.0]);
    }

    #[test]
    fn movers_only_count_symbols_on_both_days() {
        let ds = MarketDataset::new(vec![
            bar("A", 1, 10.0, 100.0),
            bar("A", 2, 12.0, 100.0),
            bar("NEW", 2, 50.0, 100.0),
        ]);
        let s = summarize_market(&ds);
        assert_eq!(s.gainers_count, 1);
        assert_eq!(s.index_value, 62.0);
    }

    #[test]
    fn single_session_compares_with_itself() {
        let ds = MarketDataset::new(vec![bar("A", 1, 10.0, 100.0)]);
        let s = summarize_market(&ds);
        assert_eq!(s.session, s.previous_session);
        assert_eq!(s.index_change, 0.0);
        assert_eq!(s.gainers_count, 0);
    }

    #[test]
    fn volume_trend_keeps_last_thirty_sessions() {
        let bars: Vec<PriceBar> = (1..=31).map(|d| bar("A", d, 10.0, d as f64)).collect();
        let s = summarize_market(&MarketDataset::new(bars));
        assert_eq!(s.volume_trend.len(), VOLUME_TREND_SESSIONS);
        assert_eq!(s.volume_trend[0].volume, 2.0);
        assert_eq!(s.volume_trend[29].volume, 31.0);
    }
}
