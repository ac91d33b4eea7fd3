//! CLI definition and dispatch.
//!
//! Results are printed to stdout as pretty JSON; progress and errors go to
//! stderr. Each subcommand is split into a report builder that works
//! against the ports, and a thin printer, so the builders can be exercised
//! with mock ports.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_ledger_adapter::JsonLedgerAdapter;
use crate::adapters::simulated_sentiment::SimulatedSentimentAdapter;
use crate::domain::analysis::{analyze_symbol, analyze_universe, AnalysisReport};
use crate::domain::anomaly::{scan_anomalies, AnomalyRecord};
use crate::domain::config_validation::{Settings, MAX_HORIZON_DAYS};
use crate::domain::decision::RiskProfile;
use crate::domain::error::TradeAssistError;
use crate::domain::forecast::{train_and_forecast, ForecastResult};
use crate::domain::indicator::{compute_indicators, IndicatorSnapshot};
use crate::domain::market_summary::{summarize_market, MarketSummary};
use crate::domain::portfolio::{
    latest_prices, optimization_suggestions, valuation, Ledger, PortfolioValuation, Transaction,
    TransactionKind,
};
use crate::domain::price_bar::{PriceBar, PriceSeries};
use crate::domain::sentiment::{
    market_mood, momentum_trend, MarketMood, SentimentReport, DEFAULT_MOOD_BASKET,
};
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::sentiment_port::SentimentPort;

#[derive(Parser, Debug)]
#[command(
    name = "tradeassist",
    about = "Trading signals, forecasts and anomaly scans for BVMT daily quotations"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding histo_cotation_* files (overrides [data] dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available symbols
    Symbols,
    /// Print the daily bars for a symbol
    History {
        #[arg(long)]
        symbol: String,
        /// Only the most recent N bars
        #[arg(long)]
        limit: Option<usize>,
    },
    /// RSI, MACD and volume ratio for a symbol
    Indicators {
        #[arg(long)]
        symbol: String,
    },
    /// Linear trend forecast for a symbol
    Forecast {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        days: Option<usize>,
    },
    /// Simulated news sentiment for a symbol
    Sentiment {
        #[arg(long)]
        symbol: String,
    },
    /// Full recommendation for a symbol
    Analyze {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Recommendations for every symbol
    Scan {
        #[arg(long)]
        profile: Option<String>,
    },
    /// Unusual volume and returns in the latest session
    Anomalies,
    /// Market summary for the latest session
    Summary,
    /// Aggregate sentiment over a basket of blue chips
    Mood,
    /// Holdings ledger
    Portfolio {
        #[command(subcommand)]
        action: PortfolioAction,
    },
    /// Validate the configuration file
    Validate,
}

#[derive(Subcommand, Debug)]
pub enum PortfolioAction {
    /// Holdings marked to the latest session
    Show,
    /// Record a purchase
    Buy {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        quantity: u64,
        #[arg(long)]
        price: f64,
        /// Trade date (YYYY-MM-DD); defaults to the latest session
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record a sale
    Sell {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        quantity: u64,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Suggestions for the given risk profile
    Optimize {
        #[arg(long)]
        profile: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), TradeAssistError> {
    let settings = load_settings(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let horizon = settings.horizon_days;

    match cli.command {
        Command::Validate => {
            eprintln!("Configuration is valid.");
            eprintln!("  data dir:      {}", settings.data_dir.display());
            eprintln!("  file prefix:   {}", settings.file_prefix);
            eprintln!("  horizon days:  {}", settings.horizon_days);
            eprintln!("  profile:       {}", settings.profile);
            eprintln!("  ledger:        {}", settings.ledger_path.display());
            eprintln!("  starting cash: {:.2}", settings.starting_cash);
            Ok(())
        }
        Command::Portfolio { action } => {
            let ledger = JsonLedgerAdapter::new(&settings.ledger_path, settings.starting_cash);
            run_portfolio(action, &settings, &ledger)
        }
        Command::Symbols => {
            let market = Market::open(&settings)?;
            let symbols = market.data.list_symbols()?;
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            Ok(())
        }
        Command::History { symbol, limit } => {
            let market = Market::open(&settings)?;
            print_json(&history_report(&market.data, &symbol, limit)?)
        }
        Command::Indicators { symbol } => {
            let market = Market::open(&settings)?;
            print_json(&indicator_report(&market.data, &symbol)?)
        }
        Command::Forecast { symbol, days } => {
            let days = check_horizon(days.unwrap_or(horizon))?;
            let market = Market::open(&settings)?;
            print_json(&forecast_report(&market.data, &symbol, days)?)
        }
        Command::Sentiment { symbol } => {
            let market = Market::open(&settings)?;
            print_json(&sentiment_report(&market.data, &market.sentiment, &symbol)?)
        }
        Command::Analyze { symbol, profile } => {
            let profile = resolve_profile(profile.as_deref(), settings.profile);
            let market = Market::open(&settings)?;
            let report =
                analysis_report(&market.data, &market.sentiment, &symbol, profile, horizon)?;
            eprintln!(
                "{}: {} ({}% confidence, {} profile)",
                report.symbol,
                report.decision.recommendation,
                report.decision.confidence,
                profile
            );
            print_json(&report)
        }
        Command::Scan { profile } => {
            let profile = resolve_profile(profile.as_deref(), settings.profile);
            let market = Market::open(&settings)?;
            let reports = scan_report(&market.data, &market.sentiment, profile, horizon)?;
            eprintln!("{} symbols analysed under {} profile", reports.len(), profile);
            print_json(&reports)
        }
        Command::Anomalies => {
            let market = Market::open(&settings)?;
            let anomalies = anomaly_report(&market.data)?;
            eprintln!("{} anomalies in the latest session", anomalies.len());
            print_json(&anomalies)
        }
        Command::Summary => {
            let market = Market::open(&settings)?;
            print_json(&market_summary_report(&market.data)?)
        }
        Command::Mood => {
            let market = Market::open(&settings)?;
            print_json(&mood_report(&market.sentiment))
        }
    }
}

/// The loaded price data plus a sentiment source dated to its latest
/// session.
pub struct Market {
    pub data: CsvAdapter,
    pub sentiment: SimulatedSentimentAdapter,
}

impl Market {
    pub fn open(settings: &Settings) -> Result<Self, TradeAssistError> {
        let data = open_data(settings)?;
        let as_of = data.dataset().latest_date().unwrap_or_default();
        let sentiment = SimulatedSentimentAdapter::new(settings.sentiment_seed, as_of);
        Ok(Self { data, sentiment })
    }
}

fn run_portfolio(
    action: PortfolioAction,
    settings: &Settings,
    ledger_port: &dyn LedgerPort,
) -> Result<(), TradeAssistError> {
    match action {
        PortfolioAction::Show => {
            let data = open_data(settings)?;
            let ledger = ledger_port.load()?;
            print_json(&portfolio_report(&ledger, &data)?)
        }
        PortfolioAction::Buy {
            symbol,
            quantity,
            price,
            date,
        } => {
            let date = trade_date(date, settings)?;
            let kind = TransactionKind::Buy;
            let tx = execute_trade(ledger_port, kind, &symbol, quantity, price, date)?;
            eprintln!("Bought {} {} at {:.3}", tx.quantity, tx.symbol, tx.price);
            print_json(&tx)
        }
        PortfolioAction::Sell {
            symbol,
            quantity,
            price,
            date,
        } => {
            let date = trade_date(date, settings)?;
            let kind = TransactionKind::Sell;
            let tx = execute_trade(ledger_port, kind, &symbol, quantity, price, date)?;
            eprintln!("Sold {} {} at {:.3}", tx.quantity, tx.symbol, tx.price);
            print_json(&tx)
        }
        PortfolioAction::Optimize { profile } => {
            let profile = resolve_profile(profile.as_deref(), settings.profile);
            let data = open_data(settings)?;
            let ledger = ledger_port.load()?;
            for suggestion in optimization_report(&ledger, &data, profile)? {
                println!("{}", suggestion);
            }
            Ok(())
        }
    }
}

/// Reads the optional config file and applies the `--data-dir` override.
pub fn load_settings(
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<Settings, TradeAssistError> {
    let mut settings = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            Settings::from_config(&adapter)?
        }
        None => Settings::default(),
    };
    if let Some(dir) = data_dir {
        settings.data_dir = dir.to_path_buf();
    }
    Ok(settings)
}

pub fn open_data(settings: &Settings) -> Result<CsvAdapter, TradeAssistError> {
    CsvAdapter::open(&settings.data_dir, &settings.file_prefix)
}

/// A CLI profile flag is lenient: unknown names fall back to Moderate.
pub fn resolve_profile(flag: Option<&str>, configured: RiskProfile) -> RiskProfile {
    flag.map(RiskProfile::parse_or_default).unwrap_or(configured)
}

pub fn check_horizon(days: usize) -> Result<usize, TradeAssistError> {
    if (1..=MAX_HORIZON_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(TradeAssistError::InvalidHorizon {
            days,
            max: MAX_HORIZON_DAYS,
        })
    }
}

fn trade_date(date: Option<NaiveDate>, settings: &Settings) -> Result<NaiveDate, TradeAssistError> {
    if let Some(date) = date {
        return Ok(date);
    }
    open_data(settings)?
        .dataset()
        .latest_date()
        .ok_or_else(|| TradeAssistError::InvalidTransaction {
            reason: "no --date given and no market data to date the trade".into(),
        })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), TradeAssistError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The series for `symbol`; an unknown symbol is an error.
pub fn require_series(data: &dyn DataPort, symbol: &str) -> Result<PriceSeries, TradeAssistError> {
    let symbol = symbol.trim().to_uppercase();
    let series = data.fetch_series(&symbol)?;
    if series.is_empty() {
        return Err(TradeAssistError::UnknownSymbol { symbol });
    }
    Ok(series)
}

pub fn history_report(
    data: &dyn DataPort,
    symbol: &str,
    limit: Option<usize>,
) -> Result<Vec<PriceBar>, TradeAssistError> {
    let series = require_series(data, symbol)?;
    let bars = match limit {
        Some(n) => series.tail(n),
        None => series.bars(),
    };
    Ok(bars.to_vec())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub indicators: IndicatorSnapshot,
}

pub fn indicator_report(
    data: &dyn DataPort,
    symbol: &str,
) -> Result<IndicatorReport, TradeAssistError> {
    let series = require_series(data, symbol)?;
    let indicators = compute_indicators(&series);
    let last = series.last().ok_or_else(|| TradeAssistError::UnknownSymbol {
        symbol: symbol.to_string(),
    })?;
    Ok(IndicatorReport {
        symbol: series.symbol().to_string(),
        date: last.date,
        close: last.close,
        indicators,
    })
}

pub fn forecast_report(
    data: &dyn DataPort,
    symbol: &str,
    horizon_days: usize,
) -> Result<ForecastResult, TradeAssistError> {
    let series = require_series(data, symbol)?;
    let result = train_and_forecast(&series, horizon_days);
    if result.is_empty() {
        eprintln!(
            "{}: not enough history to forecast ({} bars)",
            series.symbol(),
            series.len()
        );
    }
    Ok(result)
}

pub fn sentiment_report(
    data: &dyn DataPort,
    sentiment: &dyn SentimentPort,
    symbol: &str,
) -> Result<SentimentReport, TradeAssistError> {
    let series = require_series(data, symbol)?;
    Ok(sentiment.analyze(series.symbol(), momentum_trend(&series)))
}

pub fn analysis_report(
    data: &dyn DataPort,
    sentiment: &dyn SentimentPort,
    symbol: &str,
    profile: RiskProfile,
    horizon_days: usize,
) -> Result<AnalysisReport, TradeAssistError> {
    let series = require_series(data, symbol)?;
    analyze_symbol(series.symbol(), &series, sentiment, profile, horizon_days)
}

pub fn scan_report(
    data: &dyn DataPort,
    sentiment: &dyn SentimentPort,
    profile: RiskProfile,
    horizon_days: usize,
) -> Result<Vec<AnalysisReport>, TradeAssistError> {
    let dataset = data.fetch_all()?;
    analyze_universe(&dataset, sentiment, profile, horizon_days)
}

pub fn anomaly_report(data: &dyn DataPort) -> Result<Vec<AnomalyRecord>, TradeAssistError> {
    Ok(scan_anomalies(&data.fetch_all()?))
}

pub fn market_summary_report(data: &dyn DataPort) -> Result<MarketSummary, TradeAssistError> {
    Ok(summarize_market(&data.fetch_all()?))
}

pub fn mood_report(sentiment: &dyn SentimentPort) -> MarketMood {
    market_mood(sentiment, &DEFAULT_MOOD_BASKET)
}

pub fn portfolio_report(
    ledger: &Ledger,
    data: &dyn DataPort,
) -> Result<PortfolioValuation, TradeAssistError> {
    let prices = latest_prices(&data.fetch_all()?);
    Ok(valuation(ledger, &prices))
}

/// Suggestions over the holdings quoted in the latest session.
pub fn optimization_report(
    ledger: &Ledger,
    data: &dyn DataPort,
    profile: RiskProfile,
) -> Result<Vec<String>, TradeAssistError> {
    let prices = latest_prices(&data.fetch_all()?);
    Ok(optimization_suggestions(ledger, &prices, profile))
}

/// Loads the ledger, applies one trade and saves it. Nothing is written
/// when the trade is rejected.
pub fn execute_trade(
    ledger_port: &dyn LedgerPort,
    kind: TransactionKind,
    symbol: &str,
    quantity: u64,
    price: f64,
    date: NaiveDate,
) -> Result<Transaction, TradeAssistError> {
    let mut ledger = ledger_port.load()?;
    let tx = match kind {
        TransactionKind::Buy => ledger.buy(symbol, quantity, price, date)?,
        TransactionKind::Sell => ledger.sell(symbol, quantity, price, date)?,
    };
    ledger_port.save(&ledger)?;
    Ok(tx)
}
