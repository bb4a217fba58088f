//! Shared fixtures for integration tests

#![allow(dead_code)]

use chain_core::config::ChainParameters;
use chain_core::epoch::PolicyEpoch;
use chain_core::objects::{AssetObject, AssetOptions, SettingsFee, SettingsObject};
use chain_core::operations::{ChequeCreateOperation, ChequeUseOperation, TransferOperation};
use chain_core::types::{PublicKey, CORE_ASSET};
use chain_core::{AccountId, Asset, AssetId, InMemoryStore, LedgerStore, Operation, Timestamp};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

/// Asset used by the scenarios
pub const USD: AssetId = AssetId::new(1);

/// Cheque code used by the scenarios
pub const CODE: &str = "CHEQUE0000000001";

/// Ledger with accounts X and Y and a USD asset
pub struct Fixture {
    pub store: InMemoryStore,
    pub x: AccountId,
    pub y: AccountId,
}

/// Hard fork used by the fixtures
pub fn hardfork() -> Timestamp {
    Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()
}

/// Build the fixture with `balance` USD on X, in the given policy epoch
pub fn fixture(balance: i64, epoch: PolicyEpoch) -> Fixture {
    let mut store = InMemoryStore::new(ChainParameters {
        fee_policy_hardfork: hardfork(),
        ..Default::default()
    });
    let head = if epoch == PolicyEpoch::CURRENT {
        hardfork() + Duration::days(30)
    } else {
        hardfork() - Duration::days(30)
    };
    store.set_head_block_time(head);

    let committee = store.create_account("committee-account", PublicKey::new("committee"));
    let x = store.create_account("x", PublicKey::new("x-key"));
    let y = store.create_account("y", PublicKey::new("y-key"));

    for (id, symbol, market_issued) in [(CORE_ASSET, "CORE", false), (USD, "USD", false)] {
        store.insert_asset(
            AssetObject {
                id,
                symbol: symbol.to_string(),
                precision: 2,
                issuer: committee,
                options: AssetOptions::new(id),
                market_issued,
            },
            0,
        );
    }
    if balance > 0 {
        store.issue(x, Asset::new(balance, USD)).unwrap();
    }
    Fixture { store, x, y }
}

/// Configure a transfer fee percent for USD
pub fn set_transfer_percent(store: &mut InMemoryStore, percent: Decimal) {
    let mut settings: SettingsObject = store.settings().clone();
    settings.transfer_fees = vec![SettingsFee {
        asset_id: USD,
        percent,
    }];
    store.set_settings(settings);
}

/// USD transfer with a USD fee
pub fn transfer(from: AccountId, to: AccountId, amount: i64, fee: i64) -> Operation {
    TransferOperation {
        fee: Asset::new(fee, USD),
        from,
        to,
        amount: Asset::new(amount, USD),
        memo: None,
    }
    .into()
}

/// Cheque of `count` slots paying `amount` USD each
pub fn cheque_create(
    drawer: AccountId,
    amount: i64,
    count: u32,
    expiration: Timestamp,
) -> Operation {
    ChequeCreateOperation {
        fee: Asset::zero(USD),
        account_id: drawer,
        code: CODE.to_string(),
        payee_amount: Asset::new(amount, USD),
        payee_count: count,
        expiration_datetime: expiration,
    }
    .into()
}

/// Redeem [`CODE`] for `payee`
pub fn cheque_use(payee: AccountId, amount: i64) -> Operation {
    ChequeUseOperation {
        fee: Asset::zero(USD),
        account_id: payee,
        code: CODE.to_string(),
        amount: Asset::new(amount, USD),
    }
    .into()
}
