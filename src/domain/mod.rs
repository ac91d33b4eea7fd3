//! Core domain types and logic.
//!
//! The four signal components (`indicator`, `forecast`, `anomaly`,
//! `decision`) are pure functions of their inputs. Everything else here
//! (sentiment contract, ledger, market summary, orchestration) builds on them.

pub mod price_bar;
pub mod stats;
pub mod indicator;
pub mod forecast;
pub mod anomaly;
pub mod decision;
pub mod sentiment;
pub mod analysis;
pub mod market_summary;
pub mod portfolio;
pub mod config_validation;
pub mod error;
