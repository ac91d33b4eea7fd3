//! Per-symbol analysis pipeline: forecast, trend label, sentiment, decision.
//!
//! Each call trains its own forecaster on exactly the series it was given,
//! so symbols can be analysed in parallel without sharing a model.

use crate::domain::decision::{decide, DecisionResult, RiskProfile};
use crate::domain::error::TradeAssistError;
use crate::domain::forecast::{classify_trend, ForecastMetrics, TrendForecaster, TrendLabel};
use crate::domain::price_bar::{MarketDataset, PriceSeries};
use crate::domain::sentiment::{validate_sentiment_score, SentimentReport};
use crate::ports::sentiment_port::SentimentPort;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub trend: TrendLabel,
    pub decision: DecisionResult,
    pub sentiment: SentimentReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_metrics: Option<ForecastMetrics>,
}

pub fn analyze_symbol(
    symbol: &str,
    series: &PriceSeries,
    sentiment: &dyn SentimentPort,
    profile: RiskProfile,
    horizon_days: usize,
) -> Result<AnalysisReport, TradeAssistError> {
    let forecaster = TrendForecaster::train(series);
    let forecast = forecaster.forecast(horizon_days);
    let trend = classify_trend(series, &forecast);

    let report = sentiment.analyze(symbol, trend);
    let score = validate_sentiment_score(report.score)?;

    let decision = decide(symbol, series, trend, score, profile);
    log::info!(
        "{}: {} trend, sentiment {:.2}, {} ({}%)",
        symbol,
        trend,
        score,
        decision.recommendation,
        decision.confidence
    );

    Ok(AnalysisReport {
        symbol: symbol.to_string(),
        trend,
        decision,
        sentiment: report,
        forecast_metrics: forecaster.metrics().copied(),
    })
}

/// Analyses every symbol in `dataset` in parallel. Results are ordered by
/// symbol; the first failure aborts the run.
pub fn analyze_universe(
    dataset: &MarketDataset,
    sentiment: &dyn SentimentPort,
    profile: RiskProfile,
    horizon_days: usize,
) -> Result<Vec<AnalysisReport>, TradeAssistError> {
    dataset
        .per_symbol()
        .par_iter()
        .map(|(symbol, series)| analyze_symbol(symbol, series, sentiment, profile, horizon_days))
        .collect()
}
