//! Actor-based concurrency for the chain
//!
//! Single-writer pattern using a Tokio actor:
//! - One task applies transactions, one at a time
//! - Readers share the store through `RwLock` read guards
//! - Async message passing with backpressure (bounded mailbox)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               ChainHandle (Clone)                     │
//! │      Sends messages, reads store, subscribes          │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               ChainActor (Single Task)                │
//! │   write lock ─▶ processor::push_transaction ─▶ unlock │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ broadcast::channel
//!                       ▼
//!              AppliedOperation subscribers
//! ```
//!
//! Notifications are sent only after the write lock is released.

use crate::config::ActorConfig;
use crate::metrics::Metrics;
use crate::operations::Operation;
use crate::processor::{self, EvaluatedOperation};
use crate::store::{InMemoryStore, LedgerStore};
use crate::transaction::{OperationResult, ProcessedTransaction, Transaction};
use crate::types::Timestamp;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Notification for each operation of an applied transaction
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOperation {
    /// Id of the enclosing transaction
    pub trx_id: String,
    /// Position of the transaction since the head block time was last set
    pub trx_in_block: u32,
    /// Position of the operation in its transaction
    pub op_in_trx: u16,
    /// The operation
    pub operation: Operation,
    /// Result of `apply`
    pub result: OperationResult,
    /// Head block time when applied
    pub time: Timestamp,
}

/// Message sent to the chain actor
#[derive(Debug)]
pub enum ChainMessage {
    /// Apply a transaction
    PushTransaction {
        trx: Transaction,
        response: oneshot::Sender<Result<ProcessedTransaction>>,
    },

    /// Evaluate an operation without applying it
    EvaluateOperation {
        op: Operation,
        response: oneshot::Sender<Result<EvaluatedOperation>>,
    },

    /// Advance the head block time
    SetHeadBlockTime {
        time: Timestamp,
        response: oneshot::Sender<Result<()>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns writes to the store
#[derive(Debug)]
pub struct ChainActor {
    /// Shared store
    store: Arc<RwLock<InMemoryStore>>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<ChainMessage>,

    /// Applied-operation notifications
    notifications: broadcast::Sender<AppliedOperation>,

    /// Metrics
    metrics: Metrics,

    /// Transactions applied since the head block time was last set
    trx_in_block: u32,
}

impl ChainActor {
    /// Create new actor
    pub fn new(
        store: Arc<RwLock<InMemoryStore>>,
        mailbox: mpsc::Receiver<ChainMessage>,
        notifications: broadcast::Sender<AppliedOperation>,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            mailbox,
            notifications,
            metrics,
            trx_in_block: 0,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                ChainMessage::Shutdown => break,
                msg => self.handle_message(msg),
            }
        }
        tracing::info!("Chain actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: ChainMessage) {
        match msg {
            ChainMessage::PushTransaction { trx, response } => {
                let result = self.push_transaction(trx);
                let _ = response.send(result);
            }

            ChainMessage::EvaluateOperation { op, response } => {
                let result = processor::evaluate_operation(&*self.store.read(), &op);
                match &result {
                    Ok(_) => self.metrics.record_evaluated(),
                    Err(e) if e.is_validation() => self.metrics.record_rejected(),
                    Err(_) => {}
                }
                let _ = response.send(result);
            }

            ChainMessage::SetHeadBlockTime { time, response } => {
                self.store.write().set_head_block_time(time);
                self.trx_in_block = 0;
                tracing::debug!(time = %time, "Head block time set");
                let _ = response.send(Ok(()));
            }

            ChainMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    fn push_transaction(&mut self, trx: Transaction) -> Result<ProcessedTransaction> {
        let started = Instant::now();
        let outcome = {
            let mut store = self.store.write();
            processor::push_transaction(&mut *store, &trx)
                .map(|processed| (processed, store.head_block_time()))
        };

        let (processed, time) = match outcome {
            Ok(applied) => applied,
            Err(e) => {
                if e.is_validation() {
                    self.metrics.record_rejected();
                } else {
                    tracing::error!(error = %e, "Transaction failed with an internal error");
                }
                return Err(e);
            }
        };

        self.metrics
            .record_transaction(processed.results.len(), started.elapsed().as_secs_f64());
        let trx_in_block = self.trx_in_block;
        self.trx_in_block += 1;

        for (op_in_trx, (operation, result)) in
            trx.operations.into_iter().zip(&processed.results).enumerate()
        {
            if matches!(
                (&operation, result),
                (Operation::ChequeUse(_), OperationResult::Asset(_))
            ) {
                self.metrics.record_cheque_redeemed();
            }
            // No subscribers is not an error
            let _ = self.notifications.send(AppliedOperation {
                trx_id: processed.trx_id.clone(),
                trx_in_block,
                op_in_trx: op_in_trx as u16,
                operation,
                result: result.clone(),
                time,
            });
        }

        Ok(processed)
    }
}

/// Handle for sending messages to the actor and reading the store
#[derive(Clone, Debug)]
pub struct ChainHandle {
    sender: mpsc::Sender<ChainMessage>,
    store: Arc<RwLock<InMemoryStore>>,
    notifications: broadcast::Sender<AppliedOperation>,
}

impl ChainHandle {
    async fn request<T>(
        &self,
        msg: impl FnOnce(oneshot::Sender<Result<T>>) -> ChainMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(msg(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Apply a transaction
    pub async fn push_transaction(&self, trx: Transaction) -> Result<ProcessedTransaction> {
        self.request(|response| ChainMessage::PushTransaction { trx, response })
            .await
    }

    /// Evaluate an operation against the current state without applying it
    pub async fn evaluate_operation(&self, op: Operation) -> Result<EvaluatedOperation> {
        self.request(|response| ChainMessage::EvaluateOperation { op, response })
            .await
    }

    /// Advance the head block time
    pub async fn set_head_block_time(&self, time: Timestamp) -> Result<()> {
        self.request(|response| ChainMessage::SetHeadBlockTime { time, response })
            .await
    }

    /// Subscribe to applied-operation notifications
    pub fn subscribe(&self) -> broadcast::Receiver<AppliedOperation> {
        self.notifications.subscribe()
    }

    /// Run `f` under a shared read guard
    pub fn read<R>(&self, f: impl FnOnce(&InMemoryStore) -> R) -> R {
        f(&self.store.read())
    }

    /// Shared store
    pub fn store(&self) -> Arc<RwLock<InMemoryStore>> {
        self.store.clone()
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(ChainMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the chain actor owning `store`
pub fn spawn_chain_actor(
    store: InMemoryStore,
    config: &ActorConfig,
    metrics: Metrics,
) -> ChainHandle {
    let store = Arc::new(RwLock::new(store));
    let (tx, rx) = mpsc::channel(config.mailbox_capacity.max(1));
    let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
    let actor = ChainActor::new(store.clone(), rx, notifications.clone(), metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    ChainHandle {
        sender: tx,
        store,
        notifications,
    }
}
