//! Account history index
//!
//! Consumes applied-operation notifications from the chain actor and keeps,
//! per account, the most recent operations that impacted it. The fee payer is
//! always indexed alongside the accounts reported by [`get_impacted_items`].
//!
//! Stored operations are redacted: cheque codes are cleared and blind
//! transfers are replaced by an empty placeholder.

use crate::config::ApiConfig;
use crate::impacted::get_impacted_items;
use chain_core::operations::{BlindTransfer2Operation, Operation};
use chain_core::types::{AccountId, Asset};
use chain_core::{AppliedOperation, ChainHandle, LedgerStore, OperationResult, Timestamp};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// One indexed operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Global sequence number, increasing in application order
    pub sequence: u64,
    /// Id of the enclosing transaction
    pub trx_id: String,
    /// Position of the transaction
    pub trx_in_block: u32,
    /// Position of the operation in its transaction
    pub op_in_trx: u16,
    /// Redacted operation
    pub operation: Operation,
    /// Result of applying it
    pub result: OperationResult,
    /// Time applied
    pub time: Timestamp,
}

/// Bounded per-account operation history
#[derive(Debug, Clone)]
pub struct AccountHistory {
    limit: usize,
    next_sequence: u64,
    entries: BTreeMap<AccountId, VecDeque<Arc<HistoryEntry>>>,
}

impl AccountHistory {
    /// Empty history keeping at most `limit` entries per account
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            next_sequence: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Index one applied operation
    ///
    /// `store` resolves deposit owners for fund deposit operations.
    pub fn record<S: LedgerStore>(&mut self, applied: &AppliedOperation, store: Option<&S>) {
        let mut impacted = get_impacted_items(&applied.operation, store);
        impacted.accounts.insert(applied.operation.fee_payer());

        let entry = Arc::new(HistoryEntry {
            sequence: self.next_sequence,
            trx_id: applied.trx_id.clone(),
            trx_in_block: applied.trx_in_block,
            op_in_trx: applied.op_in_trx,
            operation: redact(&applied.operation),
            result: applied.result.clone(),
            time: applied.time,
        });
        self.next_sequence += 1;

        if self.limit == 0 {
            return;
        }
        for account in impacted.accounts {
            let queue = self.entries.entry(account).or_default();
            queue.push_front(entry.clone());
            queue.truncate(self.limit);
        }
    }

    /// Most recent operations of an account, newest first
    pub fn get_account_history(&self, account: AccountId, limit: usize) -> Vec<HistoryEntry> {
        self.entries
            .get(&account)
            .map(|queue| queue.iter().take(limit).map(|e| (**e).clone()).collect())
            .unwrap_or_default()
    }

    /// Number of operations indexed so far
    pub fn total_recorded(&self) -> u64 {
        self.next_sequence
    }
}

/// Copy of `op` safe to expose through history queries
pub fn redact(op: &Operation) -> Operation {
    let mut op = op.clone();
    match &mut op {
        Operation::ChequeCreate(op) => op.code.clear(),
        Operation::ChequeUse(op) => op.code.clear(),
        Operation::BlindTransfer2(op) => {
            *op = BlindTransfer2Operation {
                fee: Asset::default(),
                from: AccountId::default(),
                to: AccountId::default(),
                amount: Asset::default(),
                memo: None,
            }
        }
        _ => {}
    }
    op
}

/// Spawn a task indexing every notification of `handle` into a shared
/// history
///
/// The task ends when the notification channel closes.
pub fn spawn_history_indexer(
    handle: &ChainHandle,
    config: &ApiConfig,
) -> (Arc<RwLock<AccountHistory>>, JoinHandle<()>) {
    let history = Arc::new(RwLock::new(AccountHistory::new(config.history_limit)));
    let mut notifications = handle.subscribe();
    let store = handle.store();
    let shared = history.clone();

    let task = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(applied) => {
                    let store = store.read();
                    shared.write().record(&applied, Some(&*store));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "History indexer lagged behind notifications");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::info!("History indexer stopped");
    });

    (history, task)
}
