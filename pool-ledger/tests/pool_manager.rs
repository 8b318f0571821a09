//! Contract-level tests for the pool-manager call surface
//!
//! Every test gets its own pool, mirroring a fresh deployment.

use pool_ledger::{
    interface::{call_public, call_read_only},
    ClarityValue, ContractEvent, PoolLedger, Principal, PublicCall, PublicCallResult,
    ReadOnlyCall,
};

const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const WALLET_1: &str = "ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5";
const WALLET_2: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
const WALLET_3: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";

struct Simnet {
    pool: PoolLedger,
}

impl Simnet {
    fn new() -> Self {
        let deployer = Principal::parse(DEPLOYER).unwrap();
        Self {
            pool: PoolLedger::new(&deployer).unwrap(),
        }
    }

    fn call_public_fn(
        &mut self,
        method: &str,
        args: &[ClarityValue],
        sender: &str,
    ) -> PublicCallResult {
        let call = PublicCall::parse(method, args).unwrap();
        call_public(&mut self.pool, &Principal::parse(sender).unwrap(), &call).unwrap()
    }

    fn call_read_only_fn(&self, method: &str, args: &[ClarityValue]) -> ClarityValue {
        let call = ReadOnlyCall::parse(method, args).unwrap();
        call_read_only(&self.pool, &call)
    }

    fn balance(&self, wallet: &str) -> ClarityValue {
        self.call_read_only_fn("get-participant-balance", &[principal(wallet)])
    }
}

fn uint(v: u128) -> ClarityValue {
    ClarityValue::UInt(v)
}

fn principal(s: &str) -> ClarityValue {
    ClarityValue::Principal(Principal::parse(s).unwrap())
}

#[test]
fn test_deposit_stx_to_pool() {
    let mut simnet = Simnet::new();
    let deposit_amount = 1_000_000; // 1 STX in microSTX

    let response = simnet.call_public_fn("deposit", &[uint(deposit_amount)], WALLET_1);
    assert_eq!(response.result.ok_uint(), Some(deposit_amount));

    assert_eq!(response.events.len(), 1);
    assert_eq!(response.events[0].name(), "stx_transfer_event");
    let data = serde_json::to_value(&response.events[0]).unwrap()["data"].clone();
    assert_eq!(
        data,
        serde_json::json!({
            "sender": WALLET_1,
            "recipient": format!("{}.pool-manager", DEPLOYER),
            "amount": "1000000",
            "memo": ""
        })
    );

    assert_eq!(simnet.balance(WALLET_1), uint(deposit_amount));
    assert_eq!(
        simnet.call_read_only_fn("get-total-pool-size", &[]),
        uint(deposit_amount)
    );
}

#[test]
fn test_multiple_participants() {
    let mut simnet = Simnet::new();

    simnet.call_public_fn("deposit", &[uint(1_000_000)], WALLET_1);
    simnet.call_public_fn("deposit", &[uint(2_000_000)], WALLET_2);
    simnet.call_public_fn("deposit", &[uint(1_500_000)], WALLET_3);

    assert_eq!(simnet.call_read_only_fn("get-participant-count", &[]), uint(3));
    assert_eq!(
        simnet.call_read_only_fn("get-total-pool-size", &[]),
        uint(4_500_000)
    );
    assert_eq!(simnet.balance(WALLET_1), uint(1_000_000));
    assert_eq!(simnet.balance(WALLET_2), uint(2_000_000));
    assert_eq!(simnet.balance(WALLET_3), uint(1_500_000));
}

#[test]
fn test_withdraw_deposit() {
    let mut simnet = Simnet::new();
    simnet.call_public_fn("deposit", &[uint(1_000_000)], WALLET_1);

    let response = simnet.call_public_fn("withdraw", &[uint(400_000)], WALLET_1);
    assert_eq!(response.result.ok_uint(), Some(400_000));

    assert_eq!(response.events.len(), 1);
    let ContractEvent::StxTransferEvent(transfer) = &response.events[0];
    assert_eq!(transfer.amount.to_string(), "400000");
    assert_eq!(transfer.recipient.as_str(), WALLET_1);

    assert_eq!(simnet.balance(WALLET_1), uint(600_000));
}

#[test]
fn test_withdraw_more_than_balance() {
    let mut simnet = Simnet::new();
    simnet.call_public_fn("deposit", &[uint(1_000_000)], WALLET_1);

    let response = simnet.call_public_fn("withdraw", &[uint(2_000_000)], WALLET_1);
    assert_eq!(response.result.err_uint(), Some(100));
    assert!(response.events.is_empty());

    assert_eq!(simnet.balance(WALLET_1), uint(1_000_000));
}

#[test]
fn test_zero_deposit_rejected() {
    let mut simnet = Simnet::new();

    let response = simnet.call_public_fn("deposit", &[uint(0)], WALLET_1);
    assert_eq!(response.result.err_uint(), Some(101));
    assert_eq!(simnet.call_read_only_fn("get-total-pool-size", &[]), uint(0));
}

#[test]
fn test_withdraw_all_removes_participant() {
    let mut simnet = Simnet::new();
    simnet.call_public_fn("deposit", &[uint(1_000_000)], WALLET_1);

    assert_eq!(
        simnet.call_read_only_fn("is-active-participant", &[principal(WALLET_1)]),
        ClarityValue::Bool(true)
    );

    let response = simnet.call_public_fn("withdraw-all", &[], WALLET_1);
    assert_eq!(response.result.ok_uint(), Some(1_000_000));

    assert_eq!(
        simnet.call_read_only_fn("is-active-participant", &[principal(WALLET_1)]),
        ClarityValue::Bool(false)
    );
    assert_eq!(simnet.call_read_only_fn("get-participant-count", &[]), uint(0));
    assert_eq!(simnet.balance(WALLET_1), uint(0));
}

#[test]
fn test_withdraw_all_with_empty_balance() {
    let mut simnet = Simnet::new();

    let response = simnet.call_public_fn("withdraw-all", &[], WALLET_2);
    assert_eq!(response.result.err_uint(), Some(101));
    assert!(response.events.is_empty());
}

#[test]
fn test_contract_balance_matches_pool_size() {
    let mut simnet = Simnet::new();
    simnet.call_public_fn("deposit", &[uint(1_000_000)], WALLET_1);
    simnet.call_public_fn("deposit", &[uint(2_000_000)], WALLET_2);

    assert_eq!(
        simnet.call_read_only_fn("get-contract-stx-balance", &[]),
        uint(3_000_000)
    );
    assert_eq!(
        simnet.call_read_only_fn("get-total-pool-size", &[]),
        uint(3_000_000)
    );
}

#[test]
fn test_full_scenario() {
    let mut simnet = Simnet::new();

    simnet.call_public_fn("deposit", &[uint(1_000_000)], WALLET_1);
    assert_eq!(simnet.balance(WALLET_1), uint(1_000_000));
    assert_eq!(
        simnet.call_read_only_fn("get-total-pool-size", &[]),
        uint(1_000_000)
    );

    simnet.call_public_fn("deposit", &[uint(2_000_000)], WALLET_2);
    simnet.call_public_fn("deposit", &[uint(1_500_000)], WALLET_3);
    assert_eq!(simnet.call_read_only_fn("get-participant-count", &[]), uint(3));
    assert_eq!(
        simnet.call_read_only_fn("get-total-pool-size", &[]),
        uint(4_500_000)
    );

    let response = simnet.call_public_fn("withdraw", &[uint(400_000)], WALLET_1);
    assert_eq!(response.events[0].transfer().amount, 400_000);
    assert_eq!(simnet.balance(WALLET_1), uint(600_000));

    let response = simnet.call_public_fn("withdraw", &[uint(2_000_000)], WALLET_1);
    assert_eq!(response.result.err_uint(), Some(100));
    assert_eq!(simnet.balance(WALLET_1), uint(600_000));

    simnet.pool.check_invariants().unwrap();
}
