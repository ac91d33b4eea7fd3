//! Daily price bars, per-symbol series and the cross-symbol dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Integer-valued share count.
    pub volume: f64,
}

/// Bars for one symbol, ascending by date with unique dates.
///
/// Components never mutate a series; anything derived from it (day index,
/// returns) is computed into a local buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Sorts by date and drops repeated dates, keeping the first bar seen.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        let symbol = symbol.into();
        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        bars.dedup_by_key(|b| b.date);
        if bars.len() != before {
            log::debug!(
                "{}: dropped {} bars with duplicate dates",
                symbol,
                before - bars.len()
            );
        }
        Self { symbol, bars }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// The trailing `n` bars, or the whole series when shorter.
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}

/// Every bar for every symbol, as handed over by a data port.
#[derive(Debug, Clone, Default)]
pub struct MarketDataset {
    by_symbol: BTreeMap<String, PriceSeries>,
}

impl MarketDataset {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        let mut grouped: BTreeMap<String, Vec<PriceBar>> = BTreeMap::new();
        for bar in bars {
            grouped.entry(bar.symbol.clone()).or_default().push(bar);
        }
        let by_symbol = grouped
            .into_iter()
            .map(|(symbol, bars)| {
                let series = PriceSeries::new(symbol.clone(), bars);
                (symbol, series)
            })
            .collect();
        Self { by_symbol }
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    pub fn bar_count(&self) -> usize {
        self.by_symbol.values().map(PriceSeries::len).sum()
    }

    /// Sorted, unique symbols.
    pub fn symbols(&self) -> Vec<String> {
        self.by_symbol.keys().cloned().collect()
    }

    /// The series for `symbol`; empty when the symbol is unknown.
    pub fn series(&self, symbol: &str) -> PriceSeries {
        self.by_symbol
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| PriceSeries::new(symbol, Vec::new()))
    }

    pub fn per_symbol(&self) -> &BTreeMap<String, PriceSeries> {
        &self.by_symbol
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.by_symbol
            .values()
            .filter_map(|s| s.last().map(|b| b.date))
            .max()
    }

    /// The latest session strictly before `date`.
    pub fn previous_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.by_symbol
            .values()
            .flat_map(|s| s.bars().iter().map(|b| b.date))
            .filter(|d| *d < date)
            .max()
    }

    /// One bar per symbol that traded on `date`, ordered by symbol.
    pub fn bars_on(&self, date: NaiveDate) -> Vec<&PriceBar> {
        self.by_symbol
            .values()
            .filter_map(|s| {
                s.bars()
                    .binary_search_by_key(&date, |b| b.date)
                    .ok()
                    .map(|i| &s.bars()[i])
            })
            .collect()
    }
}
