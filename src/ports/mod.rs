//! Port traits between the domain and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod ledger_port;
pub mod sentiment_port;
