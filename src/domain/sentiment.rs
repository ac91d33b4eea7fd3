//! Sentiment score contract and market-mood aggregation.
//!
//! Scores come from a [`SentimentPort`]; the core only relies on them being
//! finite and within [-1, 1], which [`validate_sentiment_score`] enforces on
//! the caller side.

use crate::domain::error::TradeAssistError;
use crate::domain::forecast::TrendLabel;
use crate::domain::price_bar::PriceSeries;
use crate::domain::stats::{mean, round_to};
use crate::ports::sentiment_port::SentimentPort;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bars needed before `momentum_trend` leaves NEUTRAL.
pub const MOMENTUM_LOOKBACK: usize = 20;
pub const MOOD_BAND: f64 = 0.2;
pub const MOOD_HEADLINES: usize = 3;
/// Blue chips sampled for the market mood.
pub const DEFAULT_MOOD_BASKET: [&str; 5] = ["SFBT", "BIAT", "POULINA", "TILNET", "SAH"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Positive")]
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "Very Negative")]
    VeryNegative,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.5 {
            SentimentLabel::VeryPositive
        } else if score > 0.1 {
            SentimentLabel::Positive
        } else if score < -0.5 {
            SentimentLabel::VeryNegative
        } else if score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::VeryPositive => write!(f, "Very Positive"),
            SentimentLabel::Positive => write!(f, "Positive"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
            SentimentLabel::Negative => write!(f, "Negative"),
            SentimentLabel::VeryNegative => write!(f, "Very Negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub date: NaiveDate,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub symbol: String,
    /// In [-1, 1], two decimals.
    pub score: f64,
    pub label: SentimentLabel,
    pub news: Vec<NewsItem>,
}

/// Rejects scores the decision agent cannot take.
pub fn validate_sentiment_score(score: f64) -> Result<f64, TradeAssistError> {
    if score.is_finite() && (-1.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(TradeAssistError::InvalidSentiment { score })
    }
}

/// Short-term price momentum used as context when asking for sentiment:
/// the last close against the close `MOMENTUM_LOOKBACK` bars from the end.
pub fn momentum_trend(series: &PriceSeries) -> TrendLabel {
    if series.len() <= MOMENTUM_LOOKBACK {
        return TrendLabel::Neutral;
    }
    let closes = series.closes();
    let last = closes[closes.len() - 1];
    let anchor = closes[closes.len() - MOMENTUM_LOOKBACK];
    if last - anchor > 0.0 {
        TrendLabel::Bullish
    } else {
        TrendLabel::Bearish
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoodLabel {
    Optimistic,
    Neutral,
    Pessimistic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketMood {
    pub score: f64,
    pub label: MoodLabel,
    pub representative_news: Vec<NewsItem>,
}

impl MarketMood {
    /// Aggregates already-fetched reports. An empty basket is neutral.
    pub fn from_reports(reports: &[SentimentReport]) -> Self {
        let scores: Vec<f64> = reports.iter().map(|r| r.score).collect();
        let score = round_to(mean(&scores).unwrap_or(0.0), 2);
        let label = if score > MOOD_BAND {
            MoodLabel::Optimistic
        } else if score < -MOOD_BAND {
            MoodLabel::Pessimistic
        } else {
            MoodLabel::Neutral
        };
        let representative_news = reports
            .iter()
            .filter_map(|r| r.news.first().cloned())
            .take(MOOD_HEADLINES)
            .collect();
        Self {
            score,
            label,
            representative_news,
        }
    }
}

/// Samples NEUTRAL-context sentiment for each symbol in `basket`.
pub fn market_mood(port: &dyn SentimentPort, basket: &[&str]) -> MarketMood {
    let reports: Vec<SentimentReport> = basket
        .iter()
        .map(|symbol| port.analyze(symbol, TrendLabel::Neutral))
        .collect();
    MarketMood::from_reports(&reports)
}
