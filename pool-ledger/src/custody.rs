//! Contract-held token balance
//!
//! Custody is moved first on every transfer; the ledger books the entry
//! only after custody accepted it. `PoolLedger::check_invariants` compares
//! the two sides.

use crate::{types::Amount, Error, Result};

/// Native tokens held by the pool contract
#[derive(Debug, Default, Clone)]
pub struct Custody {
    balance: Amount,
}

impl Custody {
    /// Empty custody
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Take tokens into custody
    pub fn receive(&mut self, amount: Amount) -> Result<Amount> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow("contract custody balance".to_string()))?;
        Ok(self.balance)
    }

    /// Pay tokens out of custody
    pub fn release(&mut self, amount: Amount) -> Result<Amount> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(Error::InsufficientBalance {
                requested: amount,
                available: self.balance,
            })?;
        Ok(self.balance)
    }
}
