//! Holdings ledger, valuation and profile-based portfolio advice.
//!
//! Holdings are tracked at average cost. Cash is a reported balance only;
//! trades do not debit or credit it.

use crate::domain::decision::RiskProfile;
use crate::domain::error::TradeAssistError;
use crate::domain::price_bar::MarketDataset;
use crate::domain::stats::round_to;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_STARTING_CASH: f64 = 10_000.0;
pub const RISK_FREE_RATE: f64 = 0.05;
/// Assumed annual volatility for the simplified Sharpe ratio.
pub const ASSUMED_VOLATILITY: f64 = 0.15;
pub const CONSERVATIVE_MIN_CASH_RATIO: f64 = 0.3;
pub const AGGRESSIVE_MAX_CASH_RATIO: f64 = 0.1;
pub const MIN_DIVERSIFIED_HOLDINGS: usize = 3;
pub const MAX_POSITION_RATIO: f64 = 0.4;

fn default_cash() -> f64 {
    DEFAULT_STARTING_CASH
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: u64,
    pub total_cost: f64,
    pub avg_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "BUY"),
            TransactionKind::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub symbol: String,
    pub quantity: u64,
    pub price: f64,
    pub date: NaiveDate,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_pl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub holdings: BTreeMap<String, Holding>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default = "default_cash")]
    pub cash: f64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_CASH)
    }
}

fn validate_order(quantity: u64, price: f64) -> Result<(), TradeAssistError> {
    if quantity == 0 {
        return Err(TradeAssistError::InvalidTransaction {
            reason: "quantity must be positive".into(),
        });
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(TradeAssistError::InvalidTransaction {
            reason: format!("price must be positive, got {}", price),
        });
    }
    Ok(())
}

impl Ledger {
    pub fn new(cash: f64) -> Self {
        Self {
            holdings: BTreeMap::new(),
            transactions: Vec::new(),
            cash,
        }
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(&symbol.to_uppercase())
    }

    pub fn buy(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: f64,
        date: NaiveDate,
    ) -> Result<Transaction, TradeAssistError> {
        validate_order(quantity, price)?;
        let symbol = symbol.trim().to_uppercase();

        let holding = self.holdings.entry(symbol.clone()).or_insert(Holding {
            quantity: 0,
            total_cost: 0.0,
            avg_cost: 0.0,
        });
        holding.quantity += quantity;
        holding.total_cost += quantity as f64 * price;
        holding.avg_cost = holding.total_cost / holding.quantity as f64;

        let tx = Transaction {
            kind: TransactionKind::Buy,
            symbol,
            quantity,
            price,
            date,
            total: quantity as f64 * price,
            realized_pl: None,
        };
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    pub fn sell(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: f64,
        date: NaiveDate,
    ) -> Result<Transaction, TradeAssistError> {
        validate_order(quantity, price)?;
        let symbol = symbol.trim().to_uppercase();

        let held = self.holdings.get(&symbol).map_or(0, |h| h.quantity);
        if held < quantity {
            return Err(TradeAssistError::InsufficientHoldings {
                symbol,
                held,
                requested: quantity,
            });
        }

        let mut avg_cost = 0.0;
        let mut closed = false;
        if let Some(holding) = self.holdings.get_mut(&symbol) {
            avg_cost = holding.avg_cost;
            holding.quantity -= quantity;
            holding.total_cost -= quantity as f64 * avg_cost;
            if holding.quantity == 0 {
                closed = true;
            } else {
                holding.avg_cost = holding.total_cost / holding.quantity as f64;
            }
        }
        if closed {
            self.holdings.remove(&symbol);
        }

        let tx = Transaction {
            kind: TransactionKind::Sell,
            symbol,
            quantity,
            price,
            date,
            total: quantity as f64 * price,
            realized_pl: Some((price - avg_cost) * quantity as f64),
        };
        self.transactions.push(tx.clone());
        Ok(tx)
    }
}

/// Closing prices of every symbol trading in the dataset's latest session.
pub fn latest_prices(dataset: &MarketDataset) -> BTreeMap<String, f64> {
    let Some(latest) = dataset.latest_date() else {
        return BTreeMap::new();
    };
    dataset
        .bars_on(latest)
        .into_iter()
        .map(|b| (b.symbol.clone(), b.close))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Percent.
    pub roi: f64,
    pub sharpe_ratio: f64,
    /// Percent; a loss-only proxy until daily valuations are kept.
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    pub fn compute(current_value: f64, invested: f64) -> Self {
        let roi = if invested > 0.0 {
            (current_value - invested) / invested * 100.0
        } else {
            0.0
        };
        let sharpe_ratio = (roi / 100.0 - RISK_FREE_RATE) / ASSUMED_VOLATILITY;
        let max_drawdown = if roi < 0.0 { roi.abs() } else { 0.0 };
        Self {
            roi: round_to(roi, 2),
            sharpe_ratio: round_to(sharpe_ratio, 2),
            max_drawdown: round_to(max_drawdown, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValuation {
    pub symbol: String,
    pub quantity: u64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pl: f64,
    pub pl_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub holdings: Vec<HoldingValuation>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_pl: f64,
    pub cash: f64,
    pub metrics: PerformanceMetrics,
    pub transactions: Vec<Transaction>,
}

/// Marks every holding to `prices`; a symbol without a price is carried at
/// its average cost.
pub fn valuation(ledger: &Ledger, prices: &BTreeMap<String, f64>) -> PortfolioValuation {
    let mut holdings = Vec::with_capacity(ledger.holdings.len());
    let mut total_value = 0.0;
    let mut total_cost = 0.0;

    for (symbol, h) in &ledger.holdings {
        let qty = h.quantity as f64;
        let current_price = prices.get(symbol).copied().unwrap_or(h.avg_cost);
        let cost = qty * h.avg_cost;
        let market_value = qty * current_price;
        let unrealized_pl = market_value - cost;
        let pl_percent = if h.avg_cost > 0.0 {
            unrealized_pl / cost * 100.0
        } else {
            0.0
        };

        holdings.push(HoldingValuation {
            symbol: symbol.clone(),
            quantity: h.quantity,
            avg_cost: round_to(h.avg_cost, 3),
            current_price: round_to(current_price, 3),
            market_value: round_to(market_value, 3),
            unrealized_pl: round_to(unrealized_pl, 3),
            pl_percent: round_to(pl_percent, 2),
        });
        total_value += market_value;
        total_cost += cost;
    }

    PortfolioValuation {
        holdings,
        total_value: round_to(total_value, 3),
        total_cost: round_to(total_cost, 3),
        total_pl: round_to(total_value - total_cost, 3),
        cash: ledger.cash,
        metrics: PerformanceMetrics::compute(total_value, total_cost),
        transactions: ledger.transactions.clone(),
    }
}

pub const WELL_BALANCED: &str = "Your portfolio is well-balanced according to your profile.";

/// Advice on cash reserve, diversification and single-name exposure, all
/// measured against cost basis. Only holdings quoted in `prices` (the
/// latest session) are considered; cash always comes from the ledger.
pub fn optimization_suggestions(
    ledger: &Ledger,
    prices: &BTreeMap<String, f64>,
    profile: RiskProfile,
) -> Vec<String> {
    let quoted: Vec<(&String, &Holding)> = ledger
        .holdings
        .iter()
        .filter(|(symbol, _)| prices.contains_key(*symbol))
        .collect();
    let invested: f64 = quoted
        .iter()
        .map(|(_, h)| h.quantity as f64 * h.avg_cost)
        .sum();
    let mut suggestions = Vec::new();
    let cash_ratio = ledger.cash / (invested + ledger.cash + 1.0);

    match profile {
        RiskProfile::Conservative if cash_ratio < CONSERVATIVE_MIN_CASH_RATIO => {
            suggestions.push("Increase cash reserves to 30% for improved safety.".to_string());
        }
        RiskProfile::Aggressive if cash_ratio > AGGRESSIVE_MAX_CASH_RATIO => {
            suggestions.push(
                "Your cash level is high for an aggressive profile. Consider reinvesting."
                    .to_string(),
            );
        }
        _ => {}
    }

    if quoted.len() < MIN_DIVERSIFIED_HOLDINGS && invested > 0.0 {
        suggestions.push(
            "Your portfolio is concentrated. Add 2-3 more stocks to diversify risk.".to_string(),
        );
    }

    for (symbol, h) in quoted {
        let ratio = h.quantity as f64 * h.avg_cost / (invested + 1.0);
        if ratio > MAX_POSITION_RATIO {
            suggestions.push(format!(
                "High exposure to {} ({:.0}%). Consider trimming this position.",
                symbol,
                ratio * 100.0
            ));
        }
    }

    if suggestions.is_empty() {
        suggestions.push(WELL_BALANCED.to_string());
    }
    suggestions
}
