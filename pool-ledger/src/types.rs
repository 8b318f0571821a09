//! Core types for the pool ledger
//!
//! Amounts are unsigned integers in the smallest token unit (micro-STX),
//! sized like the contract's `uint`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Token amount in the smallest unit
pub type Amount = u128;

/// Name the pool contract is deployed under
pub const POOL_CONTRACT_NAME: &str = "pool-manager";

/// Account or contract address
///
/// Standard principals are plain addresses (`ST1PQ...`); contract
/// principals are `<deployer>.<contract-name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Parse a principal, rejecting empty or malformed addresses
    pub fn parse(s: impl Into<String>) -> crate::Result<Self> {
        let s = s.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(crate::Error::InvalidPrincipal(s));
        }
        if let Some((address, name)) = s.split_once('.') {
            if address.is_empty() || name.is_empty() || name.contains('.') {
                return Err(crate::Error::InvalidPrincipal(s));
            }
        }
        Ok(Self(s))
    }

    /// Contract principal for `name` deployed by `deployer`
    pub fn contract(deployer: &Principal, name: &str) -> crate::Result<Self> {
        Self::parse(format!("{}.{}", deployer.address(), name))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address part (the deployer for contract principals)
    pub fn address(&self) -> &str {
        match self.0.split_once('.') {
            Some((address, _)) => address,
            None => &self.0,
        }
    }

    /// Contract name, if this is a contract principal
    pub fn contract_name(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, name)| name)
    }

    /// Check if this is a contract principal
    pub fn is_contract(&self) -> bool {
        self.contract_name().is_some()
    }
}

impl TryFrom<String> for Principal {
    type Error = crate::Error;

    fn try_from(s: String) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native token movement between a participant and the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// Principal the tokens leave
    pub sender: Principal,

    /// Principal the tokens arrive at
    pub recipient: Principal,

    /// Amount moved, carried as a decimal string on the wire
    #[serde(with = "amount_string")]
    pub amount: Amount,

    /// Transfer memo (always empty for pool transfers)
    #[serde(default)]
    pub memo: String,
}

impl TransferEvent {
    /// Transfer with an empty memo
    pub fn new(sender: Principal, recipient: Principal, amount: Amount) -> Self {
        Self {
            sender,
            recipient,
            amount,
            memo: String::new(),
        }
    }
}

/// Event emitted by a public contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ContractEvent {
    /// Native token transfer
    StxTransferEvent(TransferEvent),
}

impl ContractEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::StxTransferEvent(_) => "stx_transfer_event",
        }
    }

    /// Transfer payload
    pub fn transfer(&self) -> &TransferEvent {
        match self {
            ContractEvent::StxTransferEvent(t) => t,
        }
    }
}

impl From<TransferEvent> for ContractEvent {
    fn from(t: TransferEvent) -> Self {
        ContractEvent::StxTransferEvent(t)
    }
}

/// Point-in-time copy of the pool state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Pool contract principal
    pub contract: Principal,

    /// Sum of all participant balances
    #[serde(with = "amount_string")]
    pub total_pool_size: Amount,

    /// Balance held in custody by the contract
    #[serde(with = "amount_string")]
    pub contract_balance: Amount,

    /// Number of participants with a positive balance
    pub participant_count: u64,

    /// Balances by participant, ordered by principal
    #[serde(with = "amount_map")]
    pub balances: BTreeMap<Principal, Amount>,
}

/// Serialize amounts as decimal strings so they survive JSON consumers
/// that cannot represent 128-bit integers. Plain integers up to `u64::MAX`
/// are accepted on input.
pub(crate) mod amount_string {
    use super::Amount;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(amount: &Amount, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Amount, D::Error> {
        d.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a decimal string or unsigned integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Amount::try_from(v).map_err(E::custom)
        }
    }
}

/// Balance maps with decimal-string values
mod amount_map {
    use super::{Amount, Principal};
    use serde::{ser::SerializeMap, Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    #[derive(Deserialize)]
    struct Wire(#[serde(with = "super::amount_string")] Amount);

    pub fn serialize<S: Serializer>(
        balances: &BTreeMap<Principal, Amount>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(balances.len()))?;
        for (participant, balance) in balances {
            map.serialize_entry(participant, &balance.to_string())?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<Principal, Amount>, D::Error> {
        let wire = BTreeMap::<Principal, Wire>::deserialize(d)?;
        Ok(wire.into_iter().map(|(p, Wire(b))| (p, b)).collect())
    }
}
