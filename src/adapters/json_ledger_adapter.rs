//! JSON file persistence for the holdings ledger.

use crate::domain::error::TradeAssistError;
use crate::domain::portfolio::Ledger;
use crate::ports::ledger_port::LedgerPort;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct JsonLedgerAdapter {
    path: PathBuf,
    starting_cash: f64,
}

impl JsonLedgerAdapter {
    /// `starting_cash` seeds the ledger when no file exists yet.
    pub fn new(path: impl Into<PathBuf>, starting_cash: f64) -> Self {
        Self {
            path: path.into(),
            starting_cash,
        }
    }
}

impl LedgerPort for JsonLedgerAdapter {
    /// A missing file is a fresh ledger. A corrupt file is logged and
    /// replaced by a fresh ledger on the next save.
    fn load(&self) -> Result<Ledger, TradeAssistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no ledger at {}, starting empty", self.path.display());
                return Ok(Ledger::new(self.starting_cash));
            }
            Err(e) => {
                return Err(TradeAssistError::Ledger {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };

        match serde_json::from_str(&content) {
            Ok(ledger) => Ok(ledger),
            Err(e) => {
                log::warn!(
                    "ledger {} is unreadable ({}), starting empty",
                    self.path.display(),
                    e
                );
                Ok(Ledger::new(self.starting_cash))
            }
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<(), TradeAssistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| TradeAssistError::Ledger {
                    reason: format!("failed to create {}: {}", parent.display(), e),
                })?;
            }
        }
        let json = serde_json::to_string_pretty(ledger)?;
        fs::write(&self.path, json).map_err(|e| TradeAssistError::Ledger {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn missing_file_is_fresh_ledger() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonLedgerAdapter::new(dir.path().join("portfolio.json"), 500.0);
        let ledger = adapter.load().unwrap();
        assert!(ledger.holdings.is_empty());
        assert_eq!(ledger.cash, 500.0);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonLedgerAdapter::new(dir.path().join("nested/portfolio.json"), 10_000.0);

        let mut ledger = adapter.load().unwrap();
        ledger.buy("SFBT", 10, 13.5, date()).unwrap();
        ledger.sell("SFBT", 4, 14.0, date()).unwrap();
        adapter.save(&ledger).unwrap();

        let reloaded = adapter.load().unwrap();
        assert_eq!(reloaded, ledger);
        assert_eq!(reloaded.holding("SFBT").unwrap().quantity, 6);
    }

    #[test]
    fn corrupt_file_recovers_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        fs::write(&path, "{ not json").unwrap();

        let ledger = JsonLedgerAdapter::new(&path, 10_000.0).load().unwrap();
        assert!(ledger.holdings.is_empty());
        assert!(ledger.transactions.is_empty());
    }

    #[test]
    fn file_layout_uses_holdings_and_transactions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        let adapter = JsonLedgerAdapter::new(&path, 10_000.0);
        let mut ledger = Ledger::default();
        ledger.buy("BIAT", 2, 95.0, date()).unwrap();
        adapter.save(&ledger).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["holdings"]["BIAT"]["quantity"], 2);
        assert_eq!(raw["holdings"]["BIAT"]["avg_cost"], 95.0);
        assert_eq!(raw["transactions"][0]["type"], "BUY");
    }
}
