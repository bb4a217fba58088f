//! Evaluator core
//!
//! Every supported operation kind has one evaluator with a two-phase
//! contract:
//!
//! 1. `evaluate` checks preconditions against the current state, without
//!    mutating it, and returns a receipt holding everything `apply` needs.
//! 2. `apply` consumes the receipt and mutates the store. It never
//!    re-validates; a failure here is an invariant violation.
//!
//! [`evaluate`] and [`apply`] dispatch over [`Operation`] with one match
//! each. Kinds without an evaluator are rejected as unsupported.

mod account;
mod assert;
mod cheque;
mod fund;
mod transfer;

pub use account::{
    AccountEdcLimitDailyVolumeEvaluator, SetBurningModeEvaluator, UpdateSettingsEvaluator,
};
pub use assert::AssertEvaluator;
pub use cheque::{
    ChequeCreateEvaluator, ChequeCreateReceipt, ChequeReverseEvaluator, ChequeReverseReceipt,
    ChequeUseEvaluator, ChequeUseReceipt,
};
pub use fund::{FundRefillEvaluator, FundRefillReceipt};
pub use transfer::{
    is_authorized_asset, not_restricted_account, BlindTransfer2Evaluator, BlindTransferReceipt,
    OverrideTransferEvaluator, TransferEvaluator, TransferReceipt,
    UpdateBlindTransfer2SettingsEvaluator,
};

use crate::epoch::PolicyEpoch;
use crate::error::{Error, Result, ValidationError};
use crate::operations::Operation;
use crate::store::LedgerStore;
use crate::transaction::OperationResult;
use crate::types::{Asset, Timestamp};

/// Inputs shared by every evaluation in one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalContext {
    /// Fee policy in force
    pub epoch: PolicyEpoch,
    /// Head block time
    pub now: Timestamp,
}

impl EvalContext {
    /// Resolve the context from the store's head block
    pub fn resolve<S: LedgerStore>(store: &S) -> Self {
        let now = store.head_block_time();
        Self {
            epoch: PolicyEpoch::resolve(store.chain_parameters(), now),
            now,
        }
    }

    /// Override the policy epoch
    pub fn with_epoch(mut self, epoch: PolicyEpoch) -> Self {
        self.epoch = epoch;
        self
    }
}

/// Two-phase handler for one operation kind
pub trait Evaluator {
    /// Operation handled
    type Op;
    /// State resolved by `evaluate` and consumed by `apply`
    type Receipt;

    /// Check preconditions without mutating the store
    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        ctx: &EvalContext,
        op: &Self::Op,
    ) -> Result<Self::Receipt>;

    /// Mutate the store
    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        ctx: &EvalContext,
        op: &Self::Op,
        receipt: Self::Receipt,
    ) -> Result<OperationResult>;
}

/// Receipt of any supported operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    /// Plain transfer
    Transfer(TransferReceipt),
    /// Blind transfer
    BlindTransfer2(BlindTransferReceipt),
    /// Issuer override transfer
    OverrideTransfer(TransferReceipt),
    /// Blind transfer default fee change
    UpdateBlindTransfer2Settings,
    /// New cheque
    ChequeCreate(ChequeCreateReceipt),
    /// Cheque redemption
    ChequeUse(ChequeUseReceipt),
    /// Cheque reversal by its drawer
    ChequeReverse(ChequeReverseReceipt),
    /// Fund refill
    FundRefill(FundRefillReceipt),
    /// Predicates held
    Assert,
    /// Burn mode toggle
    SetBurningMode,
    /// Daily volume limit toggle
    AccountEdcLimitDailyVolume,
    /// Settings fee tables change
    UpdateSettings,
}

impl Receipt {
    /// Amount `apply` debits from the fee payer on top of the principal
    pub fn extra_debit(&self) -> Option<Asset> {
        match self {
            Receipt::BlindTransfer2(receipt) if receipt.burn_fee => Some(receipt.custom_fee),
            _ => None,
        }
    }
}

/// Evaluate an operation against the store
pub fn evaluate<S: LedgerStore>(store: &S, ctx: &EvalContext, op: &Operation) -> Result<Receipt> {
    let receipt = match op {
        Operation::Transfer(op) => Receipt::Transfer(TransferEvaluator.evaluate(store, ctx, op)?),
        Operation::BlindTransfer2(op) => {
            Receipt::BlindTransfer2(BlindTransfer2Evaluator.evaluate(store, ctx, op)?)
        }
        Operation::OverrideTransfer(op) => {
            Receipt::OverrideTransfer(OverrideTransferEvaluator.evaluate(store, ctx, op)?)
        }
        Operation::UpdateBlindTransfer2Settings(op) => {
            UpdateBlindTransfer2SettingsEvaluator.evaluate(store, ctx, op)?;
            Receipt::UpdateBlindTransfer2Settings
        }
        Operation::ChequeCreate(op) => {
            Receipt::ChequeCreate(ChequeCreateEvaluator.evaluate(store, ctx, op)?)
        }
        Operation::ChequeUse(op) => Receipt::ChequeUse(ChequeUseEvaluator.evaluate(store, ctx, op)?),
        Operation::ChequeReverse(op) => {
            Receipt::ChequeReverse(ChequeReverseEvaluator.evaluate(store, ctx, op)?)
        }
        Operation::FundRefill(op) => {
            Receipt::FundRefill(FundRefillEvaluator.evaluate(store, ctx, op)?)
        }
        Operation::Assert(op) => {
            AssertEvaluator.evaluate(store, ctx, op)?;
            Receipt::Assert
        }
        Operation::SetBurningMode(op) => {
            SetBurningModeEvaluator.evaluate(store, ctx, op)?;
            Receipt::SetBurningMode
        }
        Operation::AccountEdcLimitDailyVolume(op) => {
            AccountEdcLimitDailyVolumeEvaluator.evaluate(store, ctx, op)?;
            Receipt::AccountEdcLimitDailyVolume
        }
        Operation::UpdateSettings(op) => {
            UpdateSettingsEvaluator.evaluate(store, ctx, op)?;
            Receipt::UpdateSettings
        }
        other => {
            return Err(ValidationError::UnsupportedOperation { name: other.name() }.into());
        }
    };

    tracing::debug!(op = op.name(), receipt = ?receipt, "Operation evaluated");
    Ok(receipt)
}

/// Apply an evaluated operation
pub fn apply<S: LedgerStore>(
    store: &mut S,
    ctx: &EvalContext,
    op: &Operation,
    receipt: Receipt,
) -> Result<OperationResult> {
    let result = match (op, receipt) {
        (Operation::Transfer(op), Receipt::Transfer(r)) => TransferEvaluator.apply(store, ctx, op, r),
        (Operation::BlindTransfer2(op), Receipt::BlindTransfer2(r)) => {
            BlindTransfer2Evaluator.apply(store, ctx, op, r)
        }
        (Operation::OverrideTransfer(op), Receipt::OverrideTransfer(r)) => {
            OverrideTransferEvaluator.apply(store, ctx, op, r)
        }
        (Operation::UpdateBlindTransfer2Settings(op), Receipt::UpdateBlindTransfer2Settings) => {
            UpdateBlindTransfer2SettingsEvaluator.apply(store, ctx, op, ())
        }
        (Operation::ChequeCreate(op), Receipt::ChequeCreate(r)) => {
            ChequeCreateEvaluator.apply(store, ctx, op, r)
        }
        (Operation::ChequeUse(op), Receipt::ChequeUse(r)) => ChequeUseEvaluator.apply(store, ctx, op, r),
        (Operation::ChequeReverse(op), Receipt::ChequeReverse(r)) => {
            ChequeReverseEvaluator.apply(store, ctx, op, r)
        }
        (Operation::FundRefill(op), Receipt::FundRefill(r)) => {
            FundRefillEvaluator.apply(store, ctx, op, r)
        }
        (Operation::Assert(op), Receipt::Assert) => AssertEvaluator.apply(store, ctx, op, ()),
        (Operation::SetBurningMode(op), Receipt::SetBurningMode) => {
            SetBurningModeEvaluator.apply(store, ctx, op, ())
        }
        (Operation::AccountEdcLimitDailyVolume(op), Receipt::AccountEdcLimitDailyVolume) => {
            AccountEdcLimitDailyVolumeEvaluator.apply(store, ctx, op, ())
        }
        (Operation::UpdateSettings(op), Receipt::UpdateSettings) => {
            UpdateSettingsEvaluator.apply(store, ctx, op, ())
        }
        (op, receipt) => Err(Error::InvariantViolation(format!(
            "receipt {:?} applied to operation '{}'",
            receipt,
            op.name()
        ))),
    }?;

    tracing::debug!(op = op.name(), result = ?result, "Operation applied");
    Ok(result)
}
