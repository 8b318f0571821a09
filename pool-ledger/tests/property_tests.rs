//! Property-based tests for pool invariants
//!
//! These tests use proptest to verify:
//! - Conservation: Σ(balances) == pool size == contract balance
//! - Rejected calls leave state untouched
//! - Participant count tracks positive balances
//! - Actor and direct ledger produce identical results

use pool_ledger::{
    config::ActorConfig, spawn_pool_actor, Amount, Error, Metrics, PoolLedger, Principal,
    PublicCall,
};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, Amount),
    Withdraw(usize, Amount),
    WithdrawAll(usize),
}

impl Op {
    fn wallet(&self) -> usize {
        match self {
            Op::Deposit(w, _) | Op::Withdraw(w, _) | Op::WithdrawAll(w) => *w,
        }
    }

    fn call(&self) -> PublicCall {
        match self {
            Op::Deposit(_, amount) => PublicCall::Deposit { amount: *amount },
            Op::Withdraw(_, amount) => PublicCall::Withdraw { amount: *amount },
            Op::WithdrawAll(_) => PublicCall::WithdrawAll,
        }
    }

    fn apply(&self, pool: &mut PoolLedger, wallets: &[Principal]) -> pool_ledger::Result<Amount> {
        let wallet = &wallets[self.wallet()];
        let receipt = match self {
            Op::Deposit(_, amount) => pool.deposit(wallet, *amount)?,
            Op::Withdraw(_, amount) => pool.withdraw(wallet, *amount)?,
            Op::WithdrawAll(_) => pool.withdraw_all(wallet)?,
        };
        Ok(receipt.amount)
    }
}

const WALLETS: usize = 5;

/// Strategy for generating amounts, zero included
fn amount_strategy() -> impl Strategy<Value = Amount> {
    prop_oneof![
        1 => Just(0u128),
        8 => 1u128..10_000_000u128,
    ]
}

/// Strategy for generating operations
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..WALLETS, amount_strategy()).prop_map(|(w, a)| Op::Deposit(w, a)),
        3 => (0..WALLETS, amount_strategy()).prop_map(|(w, a)| Op::Withdraw(w, a)),
        1 => (0..WALLETS).prop_map(Op::WithdrawAll),
    ]
}

fn wallets() -> Vec<Principal> {
    (0..WALLETS)
        .map(|i| Principal::parse(format!("ST{}WALLET", i + 1)).unwrap())
        .collect()
}

fn create_test_pool() -> PoolLedger {
    PoolLedger::new(&Principal::parse("ST1DEPLOYER").unwrap()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: a single deposit into an empty pool is the participant's balance
    #[test]
    fn prop_deposit_sets_balance(amount in 1u128..u64::MAX as u128) {
        let mut pool = create_test_pool();
        let wallet = &wallets()[0];

        let receipt = pool.deposit(wallet, amount).unwrap();
        prop_assert_eq!(receipt.amount, amount);
        prop_assert_eq!(pool.participant_balance(wallet), amount);
        prop_assert_eq!(pool.total_pool_size(), amount);
    }

    /// Property: overdrafts fail with code 100 and change nothing
    #[test]
    fn prop_overdraft_rejected(deposit in 1u128..1_000_000_000u128, extra in 1u128..1_000_000_000u128) {
        let mut pool = create_test_pool();
        let wallet = &wallets()[0];
        pool.deposit(wallet, deposit).unwrap();

        let before = pool.snapshot();
        let err = pool.withdraw(wallet, deposit + extra).unwrap_err();
        prop_assert_eq!(err.code(), Some(100));
        prop_assert_eq!(pool.snapshot(), before);
    }

    /// Property: conservation holds after any sequence of calls
    #[test]
    fn prop_conservation(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut pool = create_test_pool();
        let wallets = wallets();
        let mut model: HashMap<usize, Amount> = HashMap::new();

        for op in &ops {
            let before = pool.snapshot();
            match op.apply(&mut pool, &wallets) {
                Ok(amount) => {
                    let entry = model.entry(op.wallet()).or_insert(0);
                    match op {
                        Op::Deposit(..) => *entry += amount,
                        _ => *entry -= amount,
                    }
                }
                Err(e) => {
                    prop_assert!(e.is_contract_error(), "unexpected fault: {}", e);
                    prop_assert_eq!(pool.snapshot(), before);
                }
            }

            pool.check_invariants().unwrap();
        }

        let expected_total: Amount = model.values().sum();
        let expected_count = model.values().filter(|b| **b > 0).count() as u64;
        prop_assert_eq!(pool.total_pool_size(), expected_total);
        prop_assert_eq!(pool.contract_balance(), expected_total);
        prop_assert_eq!(pool.participant_count(), expected_count);

        for (i, wallet) in wallets.iter().enumerate() {
            let balance = model.get(&i).copied().unwrap_or(0);
            prop_assert_eq!(pool.participant_balance(wallet), balance);
            prop_assert_eq!(pool.is_active_participant(wallet), balance > 0);
        }
    }

    /// Property: withdrawing everything deactivates and decrements the count
    #[test]
    fn prop_full_withdrawal_deactivates(amounts in prop::collection::vec(1u128..1_000_000u128, 1..WALLETS)) {
        let mut pool = create_test_pool();
        let wallets = wallets();
        for (wallet, amount) in wallets.iter().zip(&amounts) {
            pool.deposit(wallet, *amount).unwrap();
        }

        let count = pool.participant_count();
        pool.withdraw(&wallets[0], amounts[0]).unwrap();

        prop_assert!(!pool.is_active_participant(&wallets[0]));
        prop_assert_eq!(pool.participant_count(), count - 1);
    }

    /// Property: the actor produces the same results as the ledger it owns
    #[test]
    fn prop_actor_matches_ledger(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let wallets = wallets();
            let mut direct = create_test_pool();
            let handle = spawn_pool_actor(
                create_test_pool(),
                Metrics::new().unwrap(),
                &ActorConfig::default(),
            );

            for op in &ops {
                let expected = op.apply(&mut direct, &wallets);
                let actual = handle
                    .call_public(wallets[op.wallet()].clone(), op.call())
                    .await
                    .unwrap();

                match expected {
                    Ok(amount) => prop_assert_eq!(actual.result.ok_uint(), Some(amount)),
                    Err(e) => prop_assert_eq!(actual.result.err_uint(), e.code()),
                }
            }

            prop_assert_eq!(handle.snapshot().await.unwrap(), direct.snapshot());

            handle.shutdown().await.unwrap();
            Ok(())
        })?;
    }
}

#[test]
fn test_zero_amounts_rejected() {
    let mut pool = create_test_pool();
    let wallet = &wallets()[0];

    assert!(matches!(pool.deposit(wallet, 0), Err(Error::ZeroAmount)));
    pool.deposit(wallet, 10).unwrap();
    assert!(matches!(pool.withdraw(wallet, 0), Err(Error::ZeroAmount)));
    assert_eq!(pool.participant_balance(wallet), 10);
}
