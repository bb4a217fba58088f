//! EDC Chain Core
//!
//! Operation evaluators and transaction processing for a graphene-style
//! ledger with account, asset, fund and cheque objects.
//!
//! # Architecture
//!
//! - **Two-phase evaluators**: `evaluate` checks against current state and
//!   returns a receipt, `apply` consumes it and mutates the store
//! - **Single Writer**: one actor task applies transactions; readers share
//!   the store behind a `RwLock`
//! - **All-or-nothing**: a transaction is applied to a working copy that
//!   replaces the store only on success
//! - **Policy epochs**: fee percentages and daily limits switch on at a
//!   configured hard fork
//!
//! # Trust model
//!
//! Transactions that carry signing keys are checked against the required
//! authorities. Unsigned transactions are applied as-is unless
//! `ChainParameters::require_signatures` is set, so with the default
//! parameters every holder of a [`ChainHandle`] can act for any account.
//!
//! # Invariants
//!
//! - Balances and asset supply are never negative
//! - Transfer family conserves value: what leaves the sender reaches the
//!   receiver, is burned, or is collected as a fee
//! - A cheque's remaining amount equals its unredeemed slots times the
//!   payee amount

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod authority;
pub mod cheque;
pub mod config;
pub mod epoch;
pub mod error;
pub mod evaluator;
pub mod fee;
pub mod genesis;
pub mod metrics;
pub mod objects;
pub mod operations;
pub mod processor;
pub mod store;
pub mod transaction;
pub mod types;

// Re-exports
pub use actor::{spawn_chain_actor, AppliedOperation, ChainHandle};
pub use config::{ChainParameters, Config};
pub use epoch::PolicyEpoch;
pub use error::{Error, Result, ValidationError};
pub use evaluator::{EvalContext, Evaluator, Receipt};
pub use operations::Operation;
pub use processor::{evaluate_operation, push_transaction, EvaluatedOperation};
pub use store::{InMemoryStore, LedgerStore};
pub use transaction::{OperationResult, ProcessedTransaction, Transaction};
pub use types::{AccountId, Asset, AssetId, ObjectId, ShareType, Timestamp};
