//! Configuration validation and resolved settings.
//!
//! Every key is optional. A key that is present must hold a usable value;
//! anything else is rejected up front rather than silently defaulted.

use crate::domain::decision::RiskProfile;
use crate::domain::error::TradeAssistError;
use crate::domain::forecast::DEFAULT_HORIZON_DAYS;
use crate::domain::portfolio::DEFAULT_STARTING_CASH;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_FILE_PREFIX: &str = "histo_cotation_";
pub const DEFAULT_LEDGER_PATH: &str = "portfolio.json";
pub const MAX_HORIZON_DAYS: usize = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub file_prefix: String,
    pub horizon_days: usize,
    pub profile: RiskProfile,
    pub sentiment_seed: Option<u64>,
    pub ledger_path: PathBuf,
    pub starting_cash: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            profile: RiskProfile::Moderate,
            sentiment_seed: None,
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            starting_cash: DEFAULT_STARTING_CASH,
        }
    }
}

impl Settings {
    /// Validates `config` and resolves every key against its default.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradeAssistError> {
        validate_config(config)?;
        let defaults = Settings::default();

        let horizon_days = match present(config, "analysis", "horizon_days") {
            Some(s) => parse_horizon(&s)?,
            None => defaults.horizon_days,
        };
        let profile = match present(config, "analysis", "profile") {
            Some(s) => parse_profile(&s)?,
            None => defaults.profile,
        };
        let sentiment_seed = match present(config, "sentiment", "seed") {
            Some(s) => Some(parse_seed(&s)?),
            None => None,
        };
        let starting_cash = match present(config, "portfolio", "starting_cash") {
            Some(s) => parse_cash(&s)?,
            None => defaults.starting_cash,
        };

        Ok(Self {
            data_dir: present(config, "data", "dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            file_prefix: config
                .get_string("data", "file_prefix")
                .map(|s| s.trim().to_string())
                .unwrap_or(defaults.file_prefix),
            horizon_days,
            profile,
            sentiment_seed,
            ledger_path: present(config, "portfolio", "ledger_path")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
            starting_cash,
        })
    }
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TradeAssistError> {
    validate_data_dir(config)?;
    if let Some(s) = present(config, "analysis", "horizon_days") {
        parse_horizon(&s)?;
    }
    if let Some(s) = present(config, "analysis", "profile") {
        parse_profile(&s)?;
    }
    if let Some(s) = present(config, "sentiment", "seed") {
        parse_seed(&s)?;
    }
    if let Some(s) = present(config, "portfolio", "starting_cash") {
        parse_cash(&s)?;
    }
    Ok(())
}

/// Trimmed value of a key that is set to something non-empty.
fn present(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TradeAssistError {
    TradeAssistError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), TradeAssistError> {
    match config.get_string("data", "dir") {
        Some(s) if s.trim().is_empty() => Err(invalid("data", "dir", "dir must not be empty")),
        _ => Ok(()),
    }
}

fn parse_horizon(value: &str) -> Result<usize, TradeAssistError> {
    match value.parse::<usize>() {
        Ok(days) if (1..=MAX_HORIZON_DAYS).contains(&days) => Ok(days),
        _ => Err(invalid(
            "analysis",
            "horizon_days",
            format!("horizon_days must be between 1 and {}", MAX_HORIZON_DAYS),
        )),
    }
}

fn parse_profile(value: &str) -> Result<RiskProfile, TradeAssistError> {
    value.parse::<RiskProfile>().map_err(|_| {
        invalid(
            "analysis",
            "profile",
            format!(
                "unknown profile {:?}, expected Conservative, Moderate or Aggressive",
                value
            ),
        )
    })
}

fn parse_seed(value: &str) -> Result<u64, TradeAssistError> {
    value
        .parse::<u64>()
        .map_err(|_| invalid("sentiment", "seed", "seed must be a non-negative integer"))
}

fn parse_cash(value: &str) -> Result<f64, TradeAssistError> {
    match value.parse::<f64>() {
        Ok(cash) if cash.is_finite() && cash >= 0.0 => Ok(cash),
        _ => Err(invalid(
            "portfolio",
            "starting_cash",
            "starting_cash must be a non-negative number",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }
    }

    fn assert_invalid(config: &MapConfig, expected_key: &str) {
        match validate_config(config) {
            Err(TradeAssistError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {}, got {:?}", expected_key, other),
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let settings = Settings::from_config(&MapConfig::new(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.horizon_days, 7);
        assert_eq!(settings.starting_cash, 10_000.0);
    }

    #[test]
    fn full_config_resolves() {
        let config = MapConfig::new(&[
            ("data", "dir", "/srv/bvmt"),
            ("data", "file_prefix", "cotations_"),
            ("analysis", "horizon_days", "14"),
            ("analysis", "profile", "aggressive"),
            ("sentiment", "seed", "42"),
            ("portfolio", "ledger_path", "/tmp/ledger.json"),
            ("portfolio", "starting_cash", "2500.5"),
        ]);
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/bvmt"));
        assert_eq!(settings.file_prefix, "cotations_");
        assert_eq!(settings.horizon_days, 14);
        assert_eq!(settings.profile, RiskProfile::Aggressive);
        assert_eq!(settings.sentiment_seed, Some(42));
        assert_eq!(settings.ledger_path, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(settings.starting_cash, 2500.5);
    }

    #[test]
    fn horizon_out_of_range() {
        assert_invalid(&MapConfig::new(&[("analysis", "horizon_days", "0")]), "horizon_days");
        assert_invalid(&MapConfig::new(&[("analysis", "horizon_days", "366")]), "horizon_days");
        assert_invalid(&MapConfig::new(&[("analysis", "horizon_days", "week")]), "horizon_days");
    }

    #[test]
    fn horizon_bounds_accepted() {
        assert!(validate_config(&MapConfig::new(&[("analysis", "horizon_days", "1")])).is_ok());
        assert!(validate_config(&MapConfig::new(&[("analysis", "horizon_days", "365")])).is_ok());
    }

    #[test]
    fn unknown_profile_rejected_in_config() {
        assert_invalid(&MapConfig::new(&[("analysis", "profile", "yolo")]), "profile");
    }

    #[test]
    fn negative_seed_rejected() {
        assert_invalid(&MapConfig::new(&[("sentiment", "seed", "-1")]), "seed");
    }

    #[test]
    fn negative_cash_rejected() {
        assert_invalid(&MapConfig::new(&[("portfolio", "starting_cash", "-10")]), "starting_cash");
        assert!(validate_config(&MapConfig::new(&[("portfolio", "starting_cash", "0")])).is_ok());
    }

    #[test]
    fn blank_data_dir_rejected() {
        assert_invalid(&MapConfig::new(&[("data", "dir", "  ")]), "dir");
    }
}
