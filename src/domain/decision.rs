//! Rule-based recommendation engine.
//!
//! Fuses the indicator snapshot, the forecast trend label, a sentiment score
//! and the caller's risk profile into a signed score, then grades the score
//! against the profile's buy/sell thresholds.
//!
//! | Signal    | Condition                        | Delta |
//! |-----------|----------------------------------|-------|
//! | RSI       | < 30                             | +2    |
//! | RSI       | > 70                             | -2    |
//! | MACD      | line > signal and histogram > 0  | +1.5  |
//! | MACD      | line < signal and histogram < 0  | -1.5  |
//! | Trend     | BULLISH                          | +3    |
//! | Trend     | BEARISH                          | -3    |
//! | Sentiment | > 0.3                            | +1.5  |
//! | Sentiment | < -0.3                           | -1.5  |
//!
//! Reasons are appended in table order, followed by the volume note, so the
//! trail is stable for identical inputs.

use crate::domain::error::TradeAssistError;
use crate::domain::forecast::TrendLabel;
use crate::domain::indicator::{compute_indicators, IndicatorSnapshot};
use crate::domain::price_bar::PriceSeries;
use crate::domain::stats::round_to;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Below this many bars `decide` returns an insufficient-data HOLD.
pub const MIN_DECISION_BARS: usize = 26;
pub const INSUFFICIENT_DATA_REASON: &str = "Insufficient data for full technical analysis";

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_WEIGHT: f64 = 2.0;
pub const MACD_WEIGHT: f64 = 1.5;
pub const TREND_WEIGHT: f64 = 3.0;
pub const SENTIMENT_WEIGHT: f64 = 1.5;
pub const SENTIMENT_BAND: f64 = 0.3;
pub const HIGH_VOLUME_RATIO: f64 = 1.5;

/// Distance past a threshold that upgrades BUY/SELL to STRONG.
pub const STRONG_MARGIN: f64 = 2.5;
/// Score magnitude mapped to 100% confidence before clamping.
pub const CONFIDENCE_SCALE: f64 = 8.0;
pub const MIN_CONFIDENCE: f64 = 5.0;
pub const MAX_CONFIDENCE: f64 = 98.0;
pub const HOLD_CONFIDENCE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

/// Per-profile decision parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileThresholds {
    pub buy: f64,
    pub sell: f64,
    /// Subtracted from the score when sentiment is negative.
    pub negative_sentiment_penalty: f64,
    /// Added to the score when the trend is BULLISH.
    pub bullish_trend_bonus: f64,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn thresholds(self) -> ProfileThresholds {
        match self {
            RiskProfile::Conservative => ProfileThresholds {
                buy: 4.0,
                sell: -1.5,
                negative_sentiment_penalty: 0.5,
                bullish_trend_bonus: 0.0,
            },
            RiskProfile::Moderate => ProfileThresholds {
                buy: 2.0,
                sell: -2.0,
                negative_sentiment_penalty: 0.0,
                bullish_trend_bonus: 0.0,
            },
            RiskProfile::Aggressive => ProfileThresholds {
                buy: 1.2,
                sell: -3.0,
                negative_sentiment_penalty: 0.0,
                bullish_trend_bonus: 1.0,
            },
        }
    }

    /// Parses a profile name, falling back to Moderate for anything
    /// unrecognised.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::warn!("unrecognised risk profile {:?}, using Moderate", value);
            RiskProfile::Moderate
        })
    }
}

impl FromStr for RiskProfile {
    type Err = TradeAssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            _ => Err(TradeAssistError::InvalidProfile {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskProfile::Conservative => write!(f, "Conservative"),
            RiskProfile::Moderate => write!(f, "Moderate"),
            RiskProfile::Aggressive => write!(f, "Aggressive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Recommendation {
    /// Grades a profile-adjusted score. Buy bands are checked before sell
    /// bands.
    pub fn classify(score: f64, thresholds: &ProfileThresholds) -> Self {
        if score >= thresholds.buy + STRONG_MARGIN {
            Recommendation::StrongBuy
        } else if score >= thresholds.buy {
            Recommendation::Buy
        } else if score <= thresholds.sell - STRONG_MARGIN {
            Recommendation::StrongSell
        } else if score <= thresholds.sell {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "STRONG BUY"),
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::Sell => write!(f, "SELL"),
            Recommendation::StrongSell => write!(f, "STRONG SELL"),
        }
    }
}

/// Rounded indicator values reported alongside a decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub volume_ratio: f64,
    pub current_price: f64,
    pub sentiment_score: f64,
}

impl IndicatorSummary {
    fn new(snapshot: &IndicatorSnapshot, current_price: f64, sentiment_score: f64) -> Self {
        Self {
            rsi: round_to(snapshot.rsi, 2),
            macd: round_to(snapshot.macd, 4),
            macd_signal: round_to(snapshot.macd_signal, 4),
            macd_histogram: round_to(snapshot.macd_histogram, 4),
            volume_ratio: round_to(snapshot.volume_ratio, 2),
            current_price,
            sentiment_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResult {
    pub symbol: String,
    pub recommendation: Recommendation,
    /// 0..=100; 50 for a scored HOLD, 0 when history was insufficient.
    pub confidence: u8,
    pub score: f64,
    pub profile: RiskProfile,
    pub thresholds: ProfileThresholds,
    pub reasoning: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorSummary>,
}

/// Computes indicators from `series` and grades them. Sentiment and profile
/// are assumed to be validated by the caller.
pub fn decide(
    symbol: &str,
    series: &PriceSeries,
    trend: TrendLabel,
    sentiment_score: f64,
    profile: RiskProfile,
) -> DecisionResult {
    if series.len() < MIN_DECISION_BARS {
        log::debug!(
            "{}: {} bars, need {} for a decision",
            symbol,
            series.len(),
            MIN_DECISION_BARS
        );
        return DecisionResult {
            symbol: symbol.to_string(),
            recommendation: Recommendation::Hold,
            confidence: 0,
            score: 0.0,
            profile,
            thresholds: profile.thresholds(),
            reasoning: vec![INSUFFICIENT_DATA_REASON.to_string()],
            indicators: None,
        };
    }

    let snapshot = compute_indicators(series);
    let current_price = series.last().map(|b| b.close).unwrap_or_default();
    decide_from_snapshot(
        symbol,
        &snapshot,
        current_price,
        trend,
        sentiment_score,
        profile,
    )
}

/// The scoring half of [`decide`], for callers that already hold a snapshot.
pub fn decide_from_snapshot(
    symbol: &str,
    snapshot: &IndicatorSnapshot,
    current_price: f64,
    trend: TrendLabel,
    sentiment_score: f64,
    profile: RiskProfile,
) -> DecisionResult {
    let mut score = 0.0;
    let mut reasoning = Vec::new();

    if snapshot.rsi < RSI_OVERSOLD {
        score += RSI_WEIGHT;
        reasoning.push(format!(
            "RSI ({:.1}) indicates Oversold conditions.",
            snapshot.rsi
        ));
    } else if snapshot.rsi > RSI_OVERBOUGHT {
        score -= RSI_WEIGHT;
        reasoning.push(format!(
            "RSI ({:.1}) indicates Overbought conditions.",
            snapshot.rsi
        ));
    }

    if snapshot.macd > snapshot.macd_signal && snapshot.macd_histogram > 0.0 {
        score += MACD_WEIGHT;
        reasoning.push("Bullish MACD crossover detected.".to_string());
    } else if snapshot.macd < snapshot.macd_signal && snapshot.macd_histogram < 0.0 {
        score -= MACD_WEIGHT;
        reasoning.push("Bearish MACD crossover detected.".to_string());
    }

    match trend {
        TrendLabel::Bullish => {
            score += TREND_WEIGHT;
            reasoning.push("Advanced forecasting model predicts uptrend.".to_string());
        }
        TrendLabel::Bearish => {
            score -= TREND_WEIGHT;
            reasoning.push("Advanced forecasting model predicts downtrend.".to_string());
        }
        TrendLabel::Neutral => {}
    }

    if sentiment_score > SENTIMENT_BAND {
        score += SENTIMENT_WEIGHT;
        reasoning.push("News sentiment is definitively positive.".to_string());
    } else if sentiment_score < -SENTIMENT_BAND {
        score -= SENTIMENT_WEIGHT;
        reasoning.push("News sentiment is definitively negative.".to_string());
    }

    if snapshot.volume_ratio > HIGH_VOLUME_RATIO {
        reasoning.push(format!(
            "High trading volume ({:.1}x avg) suggests strong move.",
            snapshot.volume_ratio
        ));
    }

    let thresholds = profile.thresholds();
    if sentiment_score < 0.0 {
        score -= thresholds.negative_sentiment_penalty;
    }
    if trend == TrendLabel::Bullish {
        score += thresholds.bullish_trend_bonus;
    }

    let recommendation = Recommendation::classify(score, &thresholds);
    let confidence = match recommendation {
        Recommendation::Hold => HOLD_CONFIDENCE,
        _ => (score.abs() / CONFIDENCE_SCALE * 100.0).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8,
    };

    log::debug!(
        "{}: score {:.2} under {} -> {} ({}%)",
        symbol,
        score,
        profile,
        recommendation,
        confidence
    );

    DecisionResult {
        symbol: symbol.to_string(),
        recommendation,
        confidence,
        score,
        profile,
        thresholds,
        reasoning,
        indicators: Some(IndicatorSummary::new(snapshot, current_price, sentiment_score)),
    }
}
