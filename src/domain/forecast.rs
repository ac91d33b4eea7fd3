//! Short-horizon linear trend forecasting.
//!
//! A `TrendForecaster` is trained on exactly one series and is meant to be
//! dropped after the request that built it. It fits ordinary least squares
//! lines of close and of volume against a zero-based day index over the
//! trailing `TRAINING_WINDOW` bars, records in-sample fit errors, and
//! extrapolates both lines forward.

use crate::domain::price_bar::PriceSeries;
use crate::domain::stats::{mae, mean, rmse, round_to};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_TRAINING_BARS: usize = 15;
pub const TRAINING_WINDOW: usize = 90;
pub const DEFAULT_HORIZON_DAYS: usize = 7;

/// Closes averaged as the "current" level when classifying direction.
pub const RECENT_CLOSE_WINDOW: usize = 5;
/// Fraction of the current level the forecast must move to count as a trend.
pub const TREND_BAND: f64 = 0.01;
/// Forecast and current averages closer than this are treated as equal.
pub const TREND_TIE_EPSILON: f64 = 1e-6;
/// Guard added to the current level before dividing.
pub const TREND_DIVISION_EPSILON: f64 = 1e-9;

const METRIC_DECIMALS: i32 = 4;
const PRICE_DECIMALS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Ordinary least squares of `ys` against `xs` via the normal equations
    /// on the `[1, x]` design matrix. A singular system (fewer than two
    /// distinct x values) yields a flat line at the mean of `ys`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len().min(ys.len());
        let flat = Self {
            slope: 0.0,
            intercept: mean(&ys[..n]).unwrap_or(0.0),
        };
        if n < 2 {
            return flat;
        }

        let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] });
        let target = DVector::from_column_slice(&ys[..n]);

        let xtx = design.transpose() * &design;
        let xty = design.transpose() * &target;
        let Some(xtx_inv) = xtx.try_inverse() else {
            return flat;
        };
        let beta = xtx_inv * xty;

        Self {
            slope: beta[1],
            intercept: beta[0],
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    pub rmse: f64,
    pub mae: f64,
}

impl FitMetrics {
    fn in_sample(actual: &[f64], fitted: &[f64]) -> Self {
        Self {
            rmse: round_to(rmse(actual, fitted), METRIC_DECIMALS),
            mae: round_to(mae(actual, fitted), METRIC_DECIMALS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub price: FitMetrics,
    pub volume: FitMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based offset past the last training bar.
    pub day: usize,
    pub price: f64,
    pub volume: f64,
}

/// An empty forecast with no metrics means the series was too short to train.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub forecast: Vec<ForecastPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ForecastMetrics>,
}

impl ForecastResult {
    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }
}

#[derive(Debug, Clone)]
struct TrainedModel {
    price: LinearFit,
    volume: LinearFit,
    last_index: usize,
    metrics: ForecastMetrics,
}

#[derive(Debug, Clone)]
pub struct TrendForecaster {
    model: Option<TrainedModel>,
}

impl TrendForecaster {
    /// Fits both lines; refuses to train below `MIN_TRAINING_BARS` bars.
    pub fn train(series: &PriceSeries) -> Self {
        if series.len() < MIN_TRAINING_BARS {
            log::debug!(
                "{}: {} bars, need {} to train forecaster",
                series.symbol(),
                series.len(),
                MIN_TRAINING_BARS
            );
            return Self { model: None };
        }

        let window = series.tail(TRAINING_WINDOW);
        let day_index: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();
        let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = window.iter().map(|b| b.volume).collect();

        let price = LinearFit::fit(&day_index, &closes);
        let volume = LinearFit::fit(&day_index, &volumes);

        let price_fitted: Vec<f64> = day_index.iter().map(|&x| price.predict(x)).collect();
        let volume_fitted: Vec<f64> = day_index.iter().map(|&x| volume.predict(x)).collect();

        Self {
            model: Some(TrainedModel {
                price,
                volume,
                last_index: window.len() - 1,
                metrics: ForecastMetrics {
                    price: FitMetrics::in_sample(&closes, &price_fitted),
                    volume: FitMetrics::in_sample(&volumes, &volume_fitted),
                },
            }),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn metrics(&self) -> Option<&ForecastMetrics> {
        self.model.as_ref().map(|m| &m.metrics)
    }

    /// Projects `horizon_days` days past the training window. Untrained
    /// forecasters return an empty result.
    pub fn forecast(&self, horizon_days: usize) -> ForecastResult {
        let Some(model) = &self.model else {
            return ForecastResult::default();
        };

        let forecast = (1..=horizon_days)
            .map(|day| {
                let x = (model.last_index + day) as f64;
                ForecastPoint {
                    day,
                    price: round_to(model.price.predict(x), PRICE_DECIMALS),
                    volume: model.volume.predict(x).max(0.0).round(),
                }
            })
            .collect();

        ForecastResult {
            forecast,
            metrics: Some(model.metrics),
        }
    }
}

pub fn train_and_forecast(series: &PriceSeries, horizon_days: usize) -> ForecastResult {
    TrendForecaster::train(series).forecast(horizon_days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendLabel::Bullish => write!(f, "BULLISH"),
            TrendLabel::Bearish => write!(f, "BEARISH"),
            TrendLabel::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Direction of the forecast relative to the recent close level.
///
/// Compares the mean forecast price with the mean of the last
/// `RECENT_CLOSE_WINDOW` closes (fewer if unavailable). A move of more than
/// `TREND_BAND` of the current level is BULLISH or BEARISH; anything smaller,
/// or an empty forecast, is NEUTRAL.
pub fn classify_trend(series: &PriceSeries, forecast: &ForecastResult) -> TrendLabel {
    let recent: Vec<f64> = series
        .tail(RECENT_CLOSE_WINDOW)
        .iter()
        .map(|b| b.close)
        .collect();
    let Some(current_avg) = mean(&recent) else {
        return TrendLabel::Neutral;
    };
    let prices: Vec<f64> = forecast.forecast.iter().map(|p| p.price).collect();
    let Some(future_avg) = mean(&prices) else {
        return TrendLabel::Neutral;
    };

    let diff = future_avg - current_avg;
    if diff.abs() < TREND_TIE_EPSILON
        || diff.abs() / (current_avg + TREND_DIVISION_EPSILON) < TREND_BAND
    {
        return TrendLabel::Neutral;
    }

    if diff > 0.0 {
        TrendLabel::Bullish
    } else {
        TrendLabel::Bearish
    }
}
