//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify:
//! - Value conservation across the transfer family
//! - Non-negative balances and supply after any applied transaction
//! - Cheque monotonicity
//! - Deterministic evaluation and fees

mod common;

use chain_core::cheque::ChequeStatus;
use chain_core::epoch::PolicyEpoch;
use chain_core::fee::percent_fee;
use chain_core::operations::SetBurningModeOperation;
use chain_core::types::CORE_ASSET;
use chain_core::{evaluate_operation, push_transaction, Asset, LedgerStore, Transaction};
use chrono::Duration;
use common::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Percent with up to two decimal places, 0.00 to 10.00
fn percent_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

proptest! {
    #[test]
    fn prop_transfer_conserves_value(
        balance in 1i64..1_000_000,
        amount in 1i64..1_000_000,
        percent in percent_strategy(),
        burn in any::<bool>(),
    ) {
        let Fixture { mut store, x, y } = fixture(balance, PolicyEpoch::CURRENT);
        set_transfer_percent(&mut store, percent);
        if burn {
            let op = SetBurningModeOperation {
                fee: Asset::zero(CORE_ASSET),
                account_id: y,
                enabled: true,
            };
            push_transaction(&mut store, &Transaction::new(vec![op.into()])).unwrap();
        }

        let fee = percent_fee(amount, percent).unwrap();
        let before = store.clone();
        let supply_before = store.get_asset_dynamic_data(USD).unwrap().current_supply;
        let result = push_transaction(&mut store, &Transaction::new(vec![transfer(x, y, amount, fee)]));

        if amount + fee > balance {
            prop_assert!(result.is_err());
            prop_assert_eq!(&store, &before);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(store.get_balance(x, USD).amount, balance - amount - fee);
            let data = store.get_asset_dynamic_data(USD).unwrap();
            if burn {
                // the same-asset fee is burned with the principal
                prop_assert_eq!(store.get_balance(y, USD).amount, 0);
                prop_assert_eq!(data.accumulated_fees, 0);
                prop_assert_eq!(data.current_supply, supply_before - amount - fee);
            } else {
                prop_assert_eq!(store.get_balance(y, USD).amount, amount);
                prop_assert_eq!(data.accumulated_fees, fee);
                prop_assert_eq!(data.current_supply, supply_before);
            }
        }
    }

    #[test]
    fn prop_balances_never_negative(
        transfers in prop::collection::vec((any::<bool>(), 1i64..500), 1..20),
    ) {
        let Fixture { mut store, x, y } = fixture(1_000, PolicyEpoch::LEGACY);
        for (forward, amount) in transfers {
            let (from, to) = if forward { (x, y) } else { (y, x) };
            let _ = push_transaction(&mut store, &Transaction::new(vec![transfer(from, to, amount, 0)]));

            let bx = store.get_balance(x, USD).amount;
            let by = store.get_balance(y, USD).amount;
            prop_assert!(bx >= 0 && by >= 0);
            prop_assert_eq!(bx + by, 1_000);
        }
    }

    #[test]
    fn prop_cheque_remaining_is_monotonic(
        slots in 1u32..8,
        payee_amount in 1i64..1_000,
        redemptions in 0u32..12,
    ) {
        let Fixture { mut store, x, y } = fixture(10_000, PolicyEpoch::CURRENT);
        let expiration = store.head_block_time() + Duration::days(1);
        push_transaction(
            &mut store,
            &Transaction::new(vec![cheque_create(x, payee_amount, slots, expiration)]),
        )
        .unwrap();
        let initial = payee_amount * i64::from(slots);

        for _ in 0..redemptions {
            push_transaction(&mut store, &Transaction::new(vec![cheque_use(y, payee_amount)]))
                .unwrap();
        }

        let redeemed = redemptions.min(slots);
        let cheque = store.find_cheque_by_code(CODE).unwrap();
        prop_assert_eq!(cheque.amount_remaining, initial - i64::from(redeemed) * payee_amount);
        prop_assert_eq!(cheque.status == ChequeStatus::Used, redeemed == slots);
        prop_assert_eq!(store.get_balance(y, USD).amount, i64::from(redeemed) * payee_amount);
        prop_assert_eq!(
            store.get_balance(x, USD).amount + cheque.amount_remaining + store.get_balance(y, USD).amount,
            10_000
        );
    }

    #[test]
    fn prop_evaluation_is_deterministic(
        amount in 1i64..1_000,
        percent in percent_strategy(),
    ) {
        let Fixture { mut store, x, y } = fixture(1_000, PolicyEpoch::CURRENT);
        set_transfer_percent(&mut store, percent);
        let fee = percent_fee(amount, percent).unwrap();
        prop_assert_eq!(fee, percent_fee(amount, percent).unwrap());

        let op = transfer(x, y, amount, fee);
        let first = evaluate_operation(&store, &op).map_err(|e| e.to_string());
        let second = evaluate_operation(&store, &op).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }
}
