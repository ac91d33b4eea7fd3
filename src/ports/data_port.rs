//! Market data access port trait.

use crate::domain::error::TradeAssistError;
use crate::domain::price_bar::{MarketDataset, PriceSeries};

pub trait DataPort {
    /// Bars for one symbol, ascending by date; empty when the symbol is
    /// unknown.
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TradeAssistError>;

    fn fetch_all(&self) -> Result<MarketDataset, TradeAssistError>;

    /// Sorted, unique symbols.
    fn list_symbols(&self) -> Result<Vec<String>, TradeAssistError>;
}
