//! Pool ledger
//!
//! Tracks per-participant balances and the aggregate pool size, and keeps
//! them in lockstep with the contract's custody balance.
//!
//! # Invariants
//!
//! - `Σ(balances) == total_pool_size == custody balance` after every call
//! - Only positive balances are stored, so the participant count is the
//!   number of entries
//! - A rejected call leaves every balance untouched
//!
//! # Example
//!
//! ```
//! use pool_ledger::{PoolLedger, Principal};
//!
//! # fn main() -> pool_ledger::Result<()> {
//! let deployer = Principal::parse("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")?;
//! let wallet = Principal::parse("ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5")?;
//!
//! let mut pool = PoolLedger::new(&deployer)?;
//! pool.deposit(&wallet, 1_000_000)?;
//! pool.withdraw(&wallet, 400_000)?;
//!
//! assert_eq!(pool.participant_balance(&wallet), 600_000);
//! assert_eq!(pool.total_pool_size(), pool.contract_balance());
//! # Ok(())
//! # }
//! ```

use crate::{
    custody::Custody,
    types::{Amount, PoolSnapshot, Principal, TransferEvent, POOL_CONTRACT_NAME},
    Error, Result,
};
use std::collections::BTreeMap;

/// Outcome of a successful deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Amount moved, echoed back to the caller
    pub amount: Amount,

    /// The transfer that moved it
    pub event: TransferEvent,
}

/// Deposit/withdrawal pool ledger
#[derive(Debug, Clone)]
pub struct PoolLedger {
    /// Contract principal that holds the pooled tokens
    contract: Principal,

    /// Positive balances only
    balances: BTreeMap<Principal, Amount>,

    /// Running sum of `balances`
    total_pool_size: Amount,

    /// Contract-held tokens
    custody: Custody,
}

impl PoolLedger {
    /// Empty pool deployed by `deployer` under the default contract name
    pub fn new(deployer: &Principal) -> Result<Self> {
        Self::with_contract_name(deployer, POOL_CONTRACT_NAME)
    }

    /// Empty pool deployed by `deployer` as `contract_name`
    pub fn with_contract_name(deployer: &Principal, contract_name: &str) -> Result<Self> {
        let contract = Principal::contract(deployer, contract_name)?;
        tracing::debug!("Created pool ledger for {}", contract);

        Ok(Self {
            contract,
            balances: BTreeMap::new(),
            total_pool_size: 0,
            custody: Custody::new(),
        })
    }

    /// Contract principal of the pool
    pub fn contract(&self) -> &Principal {
        &self.contract
    }

    /// Deposit `amount` from `participant` into the pool
    pub fn deposit(&mut self, participant: &Principal, amount: Amount) -> Result<Receipt> {
        if amount == 0 {
            tracing::warn!("Rejected zero deposit from {}", participant);
            return Err(Error::ZeroAmount);
        }

        let new_balance = self
            .participant_balance(participant)
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow(format!("balance of {}", participant)))?;
        let new_total = self
            .total_pool_size
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow("total pool size".to_string()))?;

        self.custody.receive(amount)?;
        self.balances.insert(participant.clone(), new_balance);
        self.total_pool_size = new_total;

        tracing::debug!(
            participant = %participant,
            amount = %amount,
            balance = %new_balance,
            "Deposit accepted"
        );

        Ok(Receipt {
            amount,
            event: TransferEvent::new(participant.clone(), self.contract.clone(), amount),
        })
    }

    /// Withdraw `amount` from `participant`'s balance
    ///
    /// The participant is removed once the balance reaches zero.
    pub fn withdraw(&mut self, participant: &Principal, amount: Amount) -> Result<Receipt> {
        if amount == 0 {
            tracing::warn!("Rejected zero withdrawal from {}", participant);
            return Err(Error::ZeroAmount);
        }

        let available = self.participant_balance(participant);
        if amount > available {
            tracing::warn!(
                "Rejected withdrawal of {} from {}: balance is {}",
                amount,
                participant,
                available
            );
            return Err(Error::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let new_total = self.total_pool_size.checked_sub(amount).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "pool size {} below balance of {}",
                self.total_pool_size, participant
            ))
        })?;

        self.custody.release(amount)?;
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(participant);
            tracing::debug!("Participant {} left the pool", participant);
        } else {
            self.balances.insert(participant.clone(), remaining);
        }
        self.total_pool_size = new_total;

        tracing::debug!(
            participant = %participant,
            amount = %amount,
            balance = %remaining,
            "Withdrawal accepted"
        );

        Ok(Receipt {
            amount,
            event: TransferEvent::new(self.contract.clone(), participant.clone(), amount),
        })
    }

    /// Withdraw the participant's entire balance
    ///
    /// With nothing deposited this is a zero withdrawal and fails the same way.
    pub fn withdraw_all(&mut self, participant: &Principal) -> Result<Receipt> {
        let balance = self.participant_balance(participant);
        self.withdraw(participant, balance)
    }

    /// Balance of `participant` (0 if unknown or fully withdrawn)
    pub fn participant_balance(&self, participant: &Principal) -> Amount {
        self.balances.get(participant).copied().unwrap_or(0)
    }

    /// Number of participants with a positive balance
    pub fn participant_count(&self) -> u64 {
        self.balances.len() as u64
    }

    /// Sum of all participant balances
    pub fn total_pool_size(&self) -> Amount {
        self.total_pool_size
    }

    /// Tokens held in custody by the contract
    pub fn contract_balance(&self) -> Amount {
        self.custody.balance()
    }

    /// Check if `participant` currently has funds in the pool
    pub fn is_active_participant(&self, participant: &Principal) -> bool {
        self.balances.contains_key(participant)
    }

    /// Active participants and their balances, ordered by principal
    pub fn participants(&self) -> impl Iterator<Item = (&Principal, Amount)> + '_ {
        self.balances.iter().map(|(p, b)| (p, *b))
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            contract: self.contract.clone(),
            total_pool_size: self.total_pool_size,
            contract_balance: self.custody.balance(),
            participant_count: self.participant_count(),
            balances: self.balances.clone(),
        }
    }

    /// Verify the standing invariants
    pub fn check_invariants(&self) -> Result<()> {
        let mut sum: Amount = 0;
        for (participant, balance) in &self.balances {
            if *balance == 0 {
                return Err(Error::InvariantViolation(format!(
                    "zero balance stored for {}",
                    participant
                )));
            }
            sum = sum.checked_add(*balance).ok_or_else(|| {
                Error::InvariantViolation("sum of balances overflows".to_string())
            })?;
        }

        if sum != self.total_pool_size {
            return Err(Error::InvariantViolation(format!(
                "sum of balances {} != pool size {}",
                sum, self.total_pool_size
            )));
        }

        if self.custody.balance() != self.total_pool_size {
            return Err(Error::InvariantViolation(format!(
                "contract balance {} != pool size {}",
                self.custody.balance(),
                self.total_pool_size
            )));
        }

        Ok(())
    }
}
