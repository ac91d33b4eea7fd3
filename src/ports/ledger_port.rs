//! Holdings ledger persistence port trait.

use crate::domain::error::TradeAssistError;
use crate::domain::portfolio::Ledger;

pub trait LedgerPort {
    fn load(&self) -> Result<Ledger, TradeAssistError>;
    fn save(&self, ledger: &Ledger) -> Result<(), TradeAssistError>;
}
