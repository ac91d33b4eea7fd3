//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_ledger_adapter;
pub mod simulated_sentiment;
