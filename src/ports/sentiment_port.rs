//! News sentiment provider port trait.

use crate::domain::forecast::TrendLabel;
use crate::domain::sentiment::SentimentReport;

/// Shared across the parallel universe scan, hence `Send + Sync`.
pub trait SentimentPort: Send + Sync {
    /// Sentiment for `symbol` given the current price trend. The score must
    /// lie in [-1, 1].
    fn analyze(&self, symbol: &str, trend: TrendLabel) -> SentimentReport;
}
