//! Contract call surface
//!
//! Maps the pool-manager method names and argument lists onto
//! [`PoolLedger`] operations, and contract errors onto `(err uN)`
//! responses.
//!
//! | Method                     | Args        | Returns                  |
//! |----------------------------|-------------|--------------------------|
//! | `deposit`                  | `uint`      | `(response uint uint)`   |
//! | `withdraw`                 | `uint`      | `(response uint uint)`   |
//! | `withdraw-all`             |             | `(response uint uint)`   |
//! | `get-participant-balance`  | `principal` | `uint`                   |
//! | `get-participant-count`    |             | `uint`                   |
//! | `get-total-pool-size`      |             | `uint`                   |
//! | `get-contract-stx-balance` |             | `uint`                   |
//! | `is-active-participant`    | `principal` | `bool`                   |

use crate::{
    pool::PoolLedger,
    types::{Amount, ContractEvent, Principal},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Typed contract value
///
/// `uint` values travel as decimal strings (`{"uint":"1000000"}`) so the
/// full 128-bit range survives JSON; plain integers are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClarityValue {
    /// Unsigned 128-bit integer
    UInt(#[serde(with = "crate::types::amount_string")] u128),
    /// Boolean
    Bool(bool),
    /// Standard or contract principal
    Principal(Principal),
}

impl ClarityValue {
    /// Integer payload, if this is a `uint`
    pub fn as_uint(&self) -> Option<u128> {
        match self {
            ClarityValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean payload, if this is a `bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClarityValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ClarityValue::UInt(_) => "uint",
            ClarityValue::Bool(_) => "bool",
            ClarityValue::Principal(_) => "principal",
        }
    }
}

impl fmt::Display for ClarityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClarityValue::UInt(v) => write!(f, "u{}", v),
            ClarityValue::Bool(v) => write!(f, "{}", v),
            ClarityValue::Principal(p) => write!(f, "'{}", p),
        }
    }
}

/// Result of a public function: `(ok ...)` or `(err ...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    /// Committed
    Ok(ClarityValue),
    /// Rolled back with an error value
    Err(ClarityValue),
}

impl Response {
    /// Check if the call committed
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }

    /// `(ok uN)` payload
    pub fn ok_uint(&self) -> Option<u128> {
        match self {
            Response::Ok(v) => v.as_uint(),
            Response::Err(_) => None,
        }
    }

    /// `(err uN)` payload
    pub fn err_uint(&self) -> Option<u128> {
        match self {
            Response::Err(v) => v.as_uint(),
            Response::Ok(_) => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok(v) => write!(f, "(ok {})", v),
            Response::Err(v) => write!(f, "(err {})", v),
        }
    }
}

/// State-mutating contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicCall {
    /// `deposit`
    Deposit {
        /// Amount to deposit
        amount: Amount,
    },
    /// `withdraw`
    Withdraw {
        /// Amount to withdraw
        amount: Amount,
    },
    /// `withdraw-all`
    WithdrawAll,
}

impl PublicCall {
    /// Parse a call from its method name and arguments
    pub fn parse(method: &str, args: &[ClarityValue]) -> Result<Self> {
        match method {
            "deposit" => Ok(PublicCall::Deposit {
                amount: uint_arg(method, args)?,
            }),
            "withdraw" => Ok(PublicCall::Withdraw {
                amount: uint_arg(method, args)?,
            }),
            "withdraw-all" => {
                no_args(method, args)?;
                Ok(PublicCall::WithdrawAll)
            }
            _ => Err(Error::UnknownMethod(method.to_string())),
        }
    }

    /// Contract method name
    pub fn method(&self) -> &'static str {
        match self {
            PublicCall::Deposit { .. } => "deposit",
            PublicCall::Withdraw { .. } => "withdraw",
            PublicCall::WithdrawAll => "withdraw-all",
        }
    }
}

/// Read-only contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOnlyCall {
    /// `get-participant-balance`
    ParticipantBalance(Principal),
    /// `get-participant-count`
    ParticipantCount,
    /// `get-total-pool-size`
    TotalPoolSize,
    /// `get-contract-stx-balance`
    ContractStxBalance,
    /// `is-active-participant`
    IsActiveParticipant(Principal),
}

impl ReadOnlyCall {
    /// Parse a call from its method name and arguments
    pub fn parse(method: &str, args: &[ClarityValue]) -> Result<Self> {
        let call = match method {
            "get-participant-balance" => {
                ReadOnlyCall::ParticipantBalance(principal_arg(method, args)?)
            }
            "is-active-participant" => {
                ReadOnlyCall::IsActiveParticipant(principal_arg(method, args)?)
            }
            "get-participant-count" => {
                no_args(method, args)?;
                ReadOnlyCall::ParticipantCount
            }
            "get-total-pool-size" => {
                no_args(method, args)?;
                ReadOnlyCall::TotalPoolSize
            }
            "get-contract-stx-balance" => {
                no_args(method, args)?;
                ReadOnlyCall::ContractStxBalance
            }
            _ => return Err(Error::UnknownMethod(method.to_string())),
        };
        Ok(call)
    }

    /// Contract method name
    pub fn method(&self) -> &'static str {
        match self {
            ReadOnlyCall::ParticipantBalance(_) => "get-participant-balance",
            ReadOnlyCall::ParticipantCount => "get-participant-count",
            ReadOnlyCall::TotalPoolSize => "get-total-pool-size",
            ReadOnlyCall::ContractStxBalance => "get-contract-stx-balance",
            ReadOnlyCall::IsActiveParticipant(_) => "is-active-participant",
        }
    }
}

/// Outcome of a public call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicCallResult {
    /// Transaction ID (UUIDv7 for time-ordering)
    pub tx_id: Uuid,

    /// Contract response
    pub result: Response,

    /// Events emitted; empty when the call was rejected
    pub events: Vec<ContractEvent>,
}

/// Execute a public call as `sender`
///
/// Contract errors come back as `(err uN)` responses. Anything else
/// (overflow, broken invariants) is returned as `Err`.
pub fn call_public(
    pool: &mut PoolLedger,
    sender: &Principal,
    call: &PublicCall,
) -> Result<PublicCallResult> {
    let outcome = match call {
        PublicCall::Deposit { amount } => pool.deposit(sender, *amount),
        PublicCall::Withdraw { amount } => pool.withdraw(sender, *amount),
        PublicCall::WithdrawAll => pool.withdraw_all(sender),
    };

    let (result, events) = match outcome {
        Ok(receipt) => (
            Response::Ok(ClarityValue::UInt(receipt.amount)),
            vec![ContractEvent::from(receipt.event)],
        ),
        Err(e) => match e.code() {
            Some(code) => (Response::Err(ClarityValue::UInt(code)), Vec::new()),
            None => return Err(e),
        },
    };

    Ok(PublicCallResult {
        tx_id: Uuid::now_v7(),
        result,
        events,
    })
}

/// Evaluate a read-only call
pub fn call_read_only(pool: &PoolLedger, call: &ReadOnlyCall) -> ClarityValue {
    match call {
        ReadOnlyCall::ParticipantBalance(p) => ClarityValue::UInt(pool.participant_balance(p)),
        ReadOnlyCall::ParticipantCount => ClarityValue::UInt(u128::from(pool.participant_count())),
        ReadOnlyCall::TotalPoolSize => ClarityValue::UInt(pool.total_pool_size()),
        ReadOnlyCall::ContractStxBalance => ClarityValue::UInt(pool.contract_balance()),
        ReadOnlyCall::IsActiveParticipant(p) => ClarityValue::Bool(pool.is_active_participant(p)),
    }
}

fn no_args(method: &str, args: &[ClarityValue]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidArguments {
            method: method.to_string(),
            reason: format!("expected no arguments, got {}", args.len()),
        })
    }
}

fn single_arg<'a>(method: &str, args: &'a [ClarityValue]) -> Result<&'a ClarityValue> {
    match args {
        [arg] => Ok(arg),
        _ => Err(Error::InvalidArguments {
            method: method.to_string(),
            reason: format!("expected 1 argument, got {}", args.len()),
        }),
    }
}

fn uint_arg(method: &str, args: &[ClarityValue]) -> Result<Amount> {
    match single_arg(method, args)? {
        ClarityValue::UInt(v) => Ok(*v),
        other => Err(Error::InvalidArguments {
            method: method.to_string(),
            reason: format!("expected uint, got {}", other.type_name()),
        }),
    }
}

fn principal_arg(method: &str, args: &[ClarityValue]) -> Result<Principal> {
    match single_arg(method, args)? {
        ClarityValue::Principal(p) => Ok(p.clone()),
        other => Err(Error::InvalidArguments {
            method: method.to_string(),
            reason: format!("expected principal, got {}", other.type_name()),
        }),
    }
}
