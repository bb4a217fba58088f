//! Query layer fed by a running chain actor

use chain_api::{spawn_history_indexer, AccountHistory, ApiConfig, DatabaseApi};
use chain_core::config::ActorConfig;
use chain_core::metrics::Metrics;
use chain_core::objects::{AssetObject, AssetOptions};
use chain_core::operations::{ChequeCreateOperation, ChequeUseOperation, Operation, TransferOperation};
use chain_core::types::{PublicKey, CORE_ASSET};
use chain_core::{
    spawn_chain_actor, AccountId, Asset, AssetId, ChainHandle, InMemoryStore, LedgerStore,
    Transaction,
};
use chrono::Duration;
use parking_lot::RwLock;
use std::sync::Arc;

const USD: AssetId = AssetId::new(1);
const CODE: &str = "QUERYCHEQUE00001";

struct Node {
    handle: ChainHandle,
    api: DatabaseApi,
    history: Arc<RwLock<AccountHistory>>,
    alice: AccountId,
    bob: AccountId,
}

fn start(config: ApiConfig) -> Node {
    let mut store = InMemoryStore::default();
    let alice = store.create_account("alice", PublicKey::new("alice-key"));
    let bob = store.create_account("bob", PublicKey::new("bob-key"));
    for (id, symbol) in [(CORE_ASSET, "CORE"), (USD, "USD")] {
        store.insert_asset(
            AssetObject {
                id,
                symbol: symbol.to_string(),
                precision: 2,
                issuer: alice,
                options: AssetOptions::new(id),
                market_issued: false,
            },
            0,
        );
    }
    store.issue(alice, Asset::new(1_000, USD)).unwrap();

    let handle = spawn_chain_actor(store, &ActorConfig::default(), Metrics::new().unwrap());
    let api = DatabaseApi::new(handle.store(), config.clone());
    let (history, _task) = spawn_history_indexer(&handle, &config);
    Node {
        handle,
        api,
        history,
        alice,
        bob,
    }
}

fn transfer(from: AccountId, to: AccountId, amount: i64) -> Operation {
    TransferOperation {
        fee: Asset::zero(CORE_ASSET),
        from,
        to,
        amount: Asset::new(amount, USD),
        memo: None,
    }
    .into()
}

async fn wait_for_history(history: &Arc<RwLock<AccountHistory>>, count: u64) {
    for _ in 0..200 {
        if history.read().total_recorded() >= count {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("history indexer did not catch up to {} operations", count);
}

#[tokio::test]
async fn test_history_follows_applied_transactions() {
    let node = start(ApiConfig::default());

    node.handle
        .push_transaction(Transaction::new(vec![
            transfer(node.alice, node.bob, 10),
            transfer(node.alice, node.bob, 20),
        ]))
        .await
        .unwrap();
    wait_for_history(&node.history, 2).await;

    let history = node.history.read();
    let bob_history = history.get_account_history(node.bob, 10);
    assert_eq!(bob_history.len(), 2);
    assert_eq!(bob_history[0].op_in_trx, 1);
    assert_eq!(bob_history[1].op_in_trx, 0);
    assert_eq!(history.get_account_history(node.alice, 10).len(), 2);
    drop(history);

    node.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rejected_transactions_are_not_indexed() {
    let node = start(ApiConfig::default());

    let err = node
        .handle
        .push_transaction(Transaction::new(vec![transfer(node.alice, node.bob, 5_000)]))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    node.handle
        .push_transaction(Transaction::new(vec![transfer(node.alice, node.bob, 1)]))
        .await
        .unwrap();
    wait_for_history(&node.history, 1).await;
    assert_eq!(node.history.read().total_recorded(), 1);

    node.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cheque_queries_and_redacted_history() {
    let node = start(ApiConfig::default());
    let expiration = node.handle.read(|s| s.head_block_time()) + Duration::days(3);

    let create: Operation = ChequeCreateOperation {
        fee: Asset::zero(USD),
        account_id: node.alice,
        code: CODE.to_string(),
        payee_amount: Asset::new(25, USD),
        payee_count: 2,
        expiration_datetime: expiration,
    }
    .into();
    node.handle
        .push_transaction(Transaction::new(vec![create]))
        .await
        .unwrap();

    let info = node.api.get_cheque_by_code(CODE).unwrap();
    assert_eq!(info.payee_amount, Asset::new(25, USD));
    assert_eq!(info.datetime_expiration, expiration);

    let cheques = node.api.get_account_cheques(node.alice, None, 10).unwrap();
    assert_eq!(cheques.len(), 1);
    assert_eq!(cheques[0].id, info.id);
    assert!(cheques[0].code.is_empty());
    assert_eq!(cheques[0].amount_remaining, 50);

    let redeem: Operation = ChequeUseOperation {
        fee: Asset::zero(USD),
        account_id: node.bob,
        code: CODE.to_string(),
        amount: Asset::new(25, USD),
    }
    .into();
    node.handle
        .push_transaction(Transaction::new(vec![redeem]))
        .await
        .unwrap();
    wait_for_history(&node.history, 2).await;

    let history = node.history.read();
    let bob_history = history.get_account_history(node.bob, 10);
    assert_eq!(bob_history.len(), 1);
    match &bob_history[0].operation {
        Operation::ChequeUse(op) => assert!(op.code.is_empty()),
        other => panic!("unexpected operation {:?}", other),
    }
    drop(history);

    assert_eq!(
        node.api.get_account_balances(node.bob, &[USD]).unwrap(),
        vec![Asset::new(25, USD)]
    );

    node.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_history_limit_applies_per_account() {
    let node = start(ApiConfig {
        history_limit: 2,
        ..ApiConfig::default()
    });

    for amount in 1..=4 {
        node.handle
            .push_transaction(Transaction::new(vec![transfer(node.alice, node.bob, amount)]))
            .await
            .unwrap();
    }
    wait_for_history(&node.history, 4).await;

    let history = node.history.read();
    let entries = history.get_account_history(node.alice, 10);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sequence, 3);
    drop(history);

    node.handle.shutdown().await.unwrap();
}
