#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tradeassist::domain::error::TradeAssistError;
use tradeassist::domain::forecast::TrendLabel;
pub use tradeassist::domain::price_bar::{MarketDataset, PriceBar, PriceSeries};
use tradeassist::domain::sentiment::{SentimentLabel, SentimentReport};
use tradeassist::ports::data_port::DataPort;
use tradeassist::ports::sentiment_port::SentimentPort;

pub struct MockDataPort {
    pub data: BTreeMap<String, Vec<PriceBar>>,
    pub fail_with: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            fail_with: None,
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            data: BTreeMap::new(),
            fail_with: Some(reason.to_string()),
        }
    }

    fn check(&self) -> Result<(), TradeAssistError> {
        match &self.fail_with {
            Some(reason) => Err(TradeAssistError::DataLoad {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TradeAssistError> {
        self.check()?;
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        Ok(PriceSeries::new(symbol, bars))
    }

    fn fetch_all(&self) -> Result<MarketDataset, TradeAssistError> {
        self.check()?;
        Ok(MarketDataset::new(
            self.data.values().flatten().cloned().collect(),
        ))
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradeAssistError> {
        self.check()?;
        Ok(self.data.keys().cloned().collect())
    }
}

/// Returns a fixed score per symbol (0.0 when unset), ignoring the trend.
pub struct MockSentimentPort {
    pub scores: HashMap<String, f64>,
}

impl MockSentimentPort {
    pub fn new() -> Self {
        Self {
            scores: HashMap::new(),
        }
    }

    pub fn with_score(mut self, symbol: &str, score: f64) -> Self {
        self.scores.insert(symbol.to_string(), score);
        self
    }
}

impl SentimentPort for MockSentimentPort {
    fn analyze(&self, symbol: &str, _trend: TrendLabel) -> SentimentReport {
        let score = self.scores.get(symbol).copied().unwrap_or(0.0);
        SentimentReport {
            symbol: symbol.to_string(),
            score,
            label: SentimentLabel::from_score(score),
            news: Vec::new(),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: &str, close: f64, volume: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        symbol: symbol.to_string(),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume,
    }
}

/// `count` consecutive daily bars whose close moves by `step` each day.
pub fn generate_bars(
    symbol: &str,
    start_date: &str,
    count: usize,
    start_price: f64,
    step: f64,
) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            PriceBar {
                date: start + chrono::Duration::days(i as i64),
                symbol: symbol.to_string(),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}
