//! Simulated news sentiment.
//!
//! No news feed is wired in. Scores are drawn around the price trend and
//! paired with templated headlines, so the decision agent sees sentiment
//! that is plausible for the symbol's recent behaviour.

use crate::domain::forecast::TrendLabel;
use crate::domain::sentiment::{NewsItem, SentimentLabel, SentimentReport};
use crate::domain::stats::round_to;
use crate::ports::sentiment_port::SentimentPort;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const PRIMARY_SOURCE: &str = "BVMT News (Simulated)";
pub const SECONDARY_SOURCE: &str = "Tunisie Eco";
/// Odds of a trending symbol getting a headline in the trend's direction.
pub const DIRECTIONAL_NEWS_ODDS: f64 = 0.7;
pub const NOISE: f64 = 0.1;

const POSITIVE_NEWS: [&str; 5] = [
    "{symbol} reports strong quarterly earnings, beating expectations.",
    "Analysts upgrade {symbol} to Buy following new partnership announcement.",
    "{symbol} expands into new markets, potential for high growth.",
    "Market sentiment bullish on {symbol} due to sector recovery.",
    "{symbol} announces share buyback program, boosting investor confidence.",
];

const NEGATIVE_NEWS: [&str; 5] = [
    "{symbol} misses revenue targets, citing supply chain issues.",
    "Regulatory concerns loom over {symbol}'s latest product launch.",
    "Analysts downgrade {symbol} amid rising competition.",
    "{symbol} faces lawsuit regarding patent infringement.",
    "Market sell-off impacts {symbol}, investors cautious.",
];

const NEUTRAL_NEWS: [&str; 5] = [
    "{symbol} holds annual shareholder meeting, no major surprises.",
    "{symbol} maintains stable outlook despite market volatility.",
    "Industry report shows mixed results for {symbol}'s sector.",
    "{symbol} announces minor leadership changes.",
    "Trading volume for {symbol} remains average this week.",
];

pub struct SimulatedSentimentAdapter {
    seed: Option<u64>,
    as_of: NaiveDate,
}

impl SimulatedSentimentAdapter {
    /// `as_of` dates the generated headlines. With a seed, each report is a
    /// pure function of (seed, symbol, trend, as_of).
    pub fn new(seed: Option<u64>, as_of: NaiveDate) -> Self {
        Self { seed, as_of }
    }

    fn rng_for(&self, symbol: &str, trend: TrendLabel) -> StdRng {
        match self.seed {
            Some(seed) => {
                let key = format!("{}|{}|{}", symbol, trend, self.as_of);
                StdRng::seed_from_u64(seed ^ fnv1a(key.as_bytes()))
            }
            None => StdRng::from_entropy(),
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn headline(rng: &mut StdRng, bank: &[&str], symbol: &str) -> String {
    bank.choose(rng)
        .copied()
        .unwrap_or("{symbol}")
        .replace("{symbol}", symbol)
}

impl SentimentPort for SimulatedSentimentAdapter {
    fn analyze(&self, symbol: &str, trend: TrendLabel) -> SentimentReport {
        let mut rng = self.rng_for(symbol, trend);

        let (base, bank): (f64, &[&str]) = match trend {
            TrendLabel::Bullish => {
                let base = rng.gen_range(0.2..=0.8);
                let bank: &[&str] = if rng.gen_bool(DIRECTIONAL_NEWS_ODDS) {
                    &POSITIVE_NEWS
                } else {
                    &NEUTRAL_NEWS
                };
                (base, bank)
            }
            TrendLabel::Bearish => {
                let base = rng.gen_range(-0.8..=-0.2);
                let bank: &[&str] = if rng.gen_bool(DIRECTIONAL_NEWS_ODDS) {
                    &NEGATIVE_NEWS
                } else {
                    &NEUTRAL_NEWS
                };
                (base, bank)
            }
            TrendLabel::Neutral => {
                let bank: &[&str] = &NEUTRAL_NEWS;
                (rng.gen_range(-0.2..=0.2), bank)
            }
        };

        let raw = (base + rng.gen_range(-NOISE..=NOISE)).clamp(-1.0, 1.0);
        let primary = headline(&mut rng, bank, symbol);
        let secondary = headline(&mut rng, &NEUTRAL_NEWS, symbol);
        let days_back = rng.gen_range(1..=5);

        SentimentReport {
            symbol: symbol.to_string(),
            score: round_to(raw, 2),
            label: SentimentLabel::from_score(raw),
            news: vec![
                NewsItem {
                    title: primary,
                    date: self.as_of,
                    source: PRIMARY_SOURCE.to_string(),
                },
                NewsItem {
                    title: secondary,
                    date: self.as_of - Duration::days(days_back),
                    source: SECONDARY_SOURCE.to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::validate_sentiment_score;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn filled(bank: &[&str], symbol: &str) -> Vec<String> {
        bank.iter().map(|t| t.replace("{symbol}", symbol)).collect()
    }

    #[test]
    fn seeded_output_is_reproducible() {
        let a = SimulatedSentimentAdapter::new(Some(7), as_of());
        let b = SimulatedSentimentAdapter::new(Some(7), as_of());
        assert_eq!(
            a.analyze("SFBT", TrendLabel::Bullish),
            b.analyze("SFBT", TrendLabel::Bullish)
        );
    }

    #[test]
    fn scores_follow_trend() {
        for seed in 0..200 {
            let adapter = SimulatedSentimentAdapter::new(Some(seed), as_of());
            let up = adapter.analyze("BIAT", TrendLabel::Bullish).score;
            assert!((0.1..=0.9).contains(&up), "bullish score {}", up);
            let down = adapter.analyze("BIAT", TrendLabel::Bearish).score;
            assert!((-0.9..=-0.1).contains(&down), "bearish score {}", down);
            let flat = adapter.analyze("BIAT", TrendLabel::Neutral).score;
            assert!((-0.3..=0.3).contains(&flat), "neutral score {}", flat);
        }
    }

    #[test]
    fn scores_pass_validation_and_are_rounded() {
        let adapter = SimulatedSentimentAdapter::new(Some(99), as_of());
        for symbol in ["SFBT", "BIAT", "POULINA", "TILNET", "SAH"] {
            let report = adapter.analyze(symbol, TrendLabel::Bullish);
            assert!(validate_sentiment_score(report.score).is_ok());
            assert_eq!(report.score, round_to(report.score, 2));
        }
    }

    #[test]
    fn news_layout() {
        let adapter = SimulatedSentimentAdapter::new(Some(3), as_of());
        let report = adapter.analyze("SAH", TrendLabel::Neutral);
        assert_eq!(report.news.len(), 2);

        let neutral = filled(&NEUTRAL_NEWS, "SAH");
        assert!(neutral.contains(&report.news[0].title));
        assert_eq!(report.news[0].date, as_of());
        assert_eq!(report.news[0].source, PRIMARY_SOURCE);

        assert!(neutral.contains(&report.news[1].title));
        let back = (as_of() - report.news[1].date).num_days();
        assert!((1..=5).contains(&back));
        assert_eq!(report.news[1].source, SECONDARY_SOURCE);
    }

    #[test]
    fn bearish_headline_never_positive() {
        let positive = filled(&POSITIVE_NEWS, "SAH");
        for seed in 0..100 {
            let adapter = SimulatedSentimentAdapter::new(Some(seed), as_of());
            let report = adapter.analyze("SAH", TrendLabel::Bearish);
            assert!(!positive.contains(&report.news[0].title));
        }
    }

    #[test]
    fn unseeded_still_in_range() {
        let adapter = SimulatedSentimentAdapter::new(None, as_of());
        let report = adapter.analyze("SFBT", TrendLabel::Neutral);
        assert!(validate_sentiment_score(report.score).is_ok());
    }
}
