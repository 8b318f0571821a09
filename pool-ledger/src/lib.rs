//! Pool Ledger
//!
//! Deposit/withdrawal pool for a native token, exposed through the
//! `pool-manager` contract call surface.
//!
//! # Architecture
//!
//! - **Ledger**: per-participant balances plus the aggregate pool size
//! - **Custody**: contract-held balance, moved before the ledger books an entry
//! - **Single Writer**: one actor task owns the ledger; handles are cheap clones
//! - **Contract Surface**: method names and `(ok ...)` / `(err uN)` responses
//! - **Service**: JSON-lines requests served against the actor

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]
//!
//! # Invariants
//!
//! - Σ(participant balances) == pool size == contract balance
//! - Participant count == number of participants with a positive balance
//! - Rejected calls have no effects and emit no events

pub mod types;
pub mod error;
pub mod custody;
pub mod pool;
pub mod interface;
pub mod actor;
pub mod config;
pub mod metrics;
pub mod service;

// Re-exports
pub use error::{Error, Result, ERR_INSUFFICIENT_BALANCE, ERR_ZERO_AMOUNT};
pub use types::{Amount, ContractEvent, PoolSnapshot, Principal, TransferEvent};
pub use pool::{PoolLedger, Receipt};
pub use interface::{ClarityValue, PublicCall, PublicCallResult, ReadOnlyCall, Response};
pub use actor::{spawn_pool_actor, PoolHandle};
pub use config::Config;
pub use metrics::Metrics;
pub use service::{Reply, Request, Service};
