//! End-to-end scenarios through the transaction processor

mod common;

use chain_core::cheque::ChequeStatus;
use chain_core::epoch::PolicyEpoch;
use chain_core::operations::{OverrideTransferOperation, SetBurningModeOperation};
use chain_core::types::CORE_ASSET;
use chain_core::{
    push_transaction, Asset, LedgerStore, OperationResult, Transaction, ValidationError,
};
use chrono::Duration;
use common::*;
use rust_decimal::Decimal;

#[test]
fn transfer_without_fee_policy() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);

    let trx = Transaction::new(vec![transfer(x, y, 40, 0)]);
    let processed = push_transaction(&mut store, &trx).unwrap();

    assert_eq!(processed.results, vec![OperationResult::Void]);
    assert_eq!(store.get_balance(x, USD).amount, 60);
    assert_eq!(store.get_balance(y, USD).amount, 40);
}

#[test]
fn percent_fee_is_charged() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);
    set_transfer_percent(&mut store, Decimal::new(5, 0));

    let trx = Transaction::new(vec![transfer(x, y, 40, 2)]);
    push_transaction(&mut store, &trx).unwrap();

    assert_eq!(store.get_balance(x, USD).amount, 58);
    assert_eq!(store.get_balance(y, USD).amount, 40);
    assert_eq!(store.get_asset_dynamic_data(USD).unwrap().accumulated_fees, 2);
}

#[test]
fn underpaid_fee_changes_nothing() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);
    set_transfer_percent(&mut store, Decimal::new(5, 0));
    let before = store.clone();

    let trx = Transaction::new(vec![transfer(x, y, 40, 1)]);
    let err = push_transaction(&mut store, &trx).unwrap_err();

    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::InsufficientFee {
            declared: Asset::new(1, USD),
            required: Asset::new(2, USD),
        })
    );
    assert_eq!(store, before);
}

#[test]
fn legacy_epoch_ignores_percent() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::LEGACY);
    set_transfer_percent(&mut store, Decimal::new(5, 0));

    let trx = Transaction::new(vec![transfer(x, y, 100, 0)]);
    push_transaction(&mut store, &trx).unwrap();
    assert_eq!(store.get_balance(y, USD).amount, 100);
}

#[test]
fn cheque_lifecycle() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);
    let expiration = store.head_block_time() + Duration::days(7);

    let created = push_transaction(
        &mut store,
        &Transaction::new(vec![cheque_create(x, 10, 3, expiration)]),
    )
    .unwrap();
    let cheque_id = match created.results[0] {
        OperationResult::Object(id) => id,
        ref other => panic!("expected object id, got {:?}", other),
    };
    assert_eq!(cheque_id.to_string(), "1.18.0");
    assert_eq!(store.get_balance(x, USD).amount, 70);

    push_transaction(&mut store, &Transaction::new(vec![cheque_use(y, 10)])).unwrap();
    let cheque = store.find_cheque_by_code(CODE).unwrap();
    assert_eq!(cheque.amount_remaining, 20);
    assert_eq!(cheque.status, ChequeStatus::New);

    for _ in 0..2 {
        push_transaction(&mut store, &Transaction::new(vec![cheque_use(y, 10)])).unwrap();
    }
    let cheque = store.find_cheque_by_code(CODE).unwrap();
    assert_eq!(cheque.amount_remaining, 0);
    assert_eq!(cheque.status, ChequeStatus::Used);
    assert_eq!(store.get_balance(y, USD).amount, 30);

    // fourth redemption is accepted and changes nothing
    let before = store.clone();
    let processed =
        push_transaction(&mut store, &Transaction::new(vec![cheque_use(y, 10)])).unwrap();
    assert_eq!(processed.results, vec![OperationResult::Void]);
    assert_eq!(store, before);
}

#[test]
fn burn_mode_rejects_market_issued_asset() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);
    let mut usd = store.get_asset(USD).unwrap().clone();
    usd.market_issued = true;
    store.insert_asset(usd, 100);

    let enable_burn = SetBurningModeOperation {
        fee: Asset::zero(CORE_ASSET),
        account_id: y,
        enabled: true,
    };
    push_transaction(&mut store, &Transaction::new(vec![enable_burn.into()])).unwrap();
    let before = store.clone();

    let err = push_transaction(&mut store, &Transaction::new(vec![transfer(x, y, 10, 0)]))
        .unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::BurnMarketIssuedAsset {
            symbol: "USD".to_string()
        })
    );
    assert_eq!(store, before);
}

#[test]
fn burn_mode_reduces_supply_for_plain_assets() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);
    let enable_burn = SetBurningModeOperation {
        fee: Asset::zero(CORE_ASSET),
        account_id: y,
        enabled: true,
    };
    let trx = Transaction::new(vec![enable_burn.into(), transfer(x, y, 25, 0)]);
    push_transaction(&mut store, &trx).unwrap();

    assert_eq!(store.get_balance(y, USD).amount, 0);
    assert_eq!(store.get_asset_dynamic_data(USD).unwrap().current_supply, 75);
}

#[test]
fn burn_mode_burns_same_asset_fee() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);
    set_transfer_percent(&mut store, Decimal::new(5, 0));
    let enable_burn = SetBurningModeOperation {
        fee: Asset::zero(CORE_ASSET),
        account_id: y,
        enabled: true,
    };
    let trx = Transaction::new(vec![enable_burn.into(), transfer(x, y, 40, 2)]);
    push_transaction(&mut store, &trx).unwrap();

    assert_eq!(store.get_balance(x, USD).amount, 58);
    assert_eq!(store.get_balance(y, USD).amount, 0);
    let data = store.get_asset_dynamic_data(USD).unwrap();
    assert_eq!(data.current_supply, 58);
    assert_eq!(data.accumulated_fees, 0);
}

#[test]
fn override_transfer_is_rejected_without_flag() {
    let Fixture { mut store, x, y } = fixture(100, PolicyEpoch::CURRENT);
    let issuer = store.get_asset(USD).unwrap().issuer;
    let op = OverrideTransferOperation {
        fee: Asset::zero(CORE_ASSET),
        issuer,
        from: x,
        to: y,
        amount: Asset::new(5, USD),
        memo: None,
    };
    let err = push_transaction(&mut store, &Transaction::new(vec![op.into()])).unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::OverrideTransferNotPermitted { asset: USD })
    );
}
