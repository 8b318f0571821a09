//! Error types for the pool ledger

use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Contract error code: withdrawal exceeds the participant's balance
pub const ERR_INSUFFICIENT_BALANCE: u128 = 100;

/// Contract error code: zero-amount deposit or withdrawal
pub const ERR_ZERO_AMOUNT: u128 = 101;

/// Pool ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Amount was zero
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Withdrawal larger than the available balance
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount asked for
        requested: u128,
        /// Amount actually held
        available: u128,
    },

    /// Balance or pool total would overflow
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Standing invariant broken (pool size vs custody, participant count)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Method name not part of the contract surface
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Wrong argument count or type for a method
    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArguments {
        /// Method being called
        method: String,
        /// What was wrong
        reason: String,
    },

    /// Malformed principal
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed service request
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Numeric error code returned by the contract, if this is a contract error.
    ///
    /// Only validation failures the contract itself reports carry a code;
    /// everything else is a fault of the caller or the host.
    pub fn code(&self) -> Option<u128> {
        match self {
            Error::ZeroAmount => Some(ERR_ZERO_AMOUNT),
            Error::InsufficientBalance { .. } => Some(ERR_INSUFFICIENT_BALANCE),
            _ => None,
        }
    }

    /// Whether this error is a contract-level rejection
    pub fn is_contract_error(&self) -> bool {
        self.code().is_some()
    }
}
