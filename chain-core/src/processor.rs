//! Transaction processor
//!
//! Wraps the evaluators with the checks every operation shares:
//!
//! - stateless `validate()` of the operation
//! - signature check against the required authorities when keys are given,
//!   or a rejection of unsigned transactions when
//!   `ChainParameters::require_signatures` is set
//! - flat fee from the fee schedule, converted into the declared fee asset
//! - fee payer solvency for the declared fee plus any principal in the same
//!   asset
//!
//! [`push_transaction`] applies every operation of a transaction inside an
//! undo session and rolls all of them back if any one fails.

use crate::authority::{verify_authority, AuthorityOracle};
use crate::error::{ensure, Error, Result, ValidationError};
use crate::evaluator::{self, EvalContext, Receipt};
use crate::operations::{Operation, RequiredAuthorities};
use crate::store::LedgerStore;
use crate::transaction::{OperationResult, ProcessedTransaction, Transaction};
use crate::types::Asset;

/// Operation that passed evaluation, ready to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedOperation {
    /// Context the operation was evaluated in
    pub context: EvalContext,
    /// Flat fee required by the fee schedule, in the declared fee asset
    pub required_fee: Asset,
    /// Evaluator receipt
    pub receipt: Receipt,
}

fn check_fee<S: LedgerStore>(store: &S, op: &Operation) -> Result<Asset> {
    let declared = op.fee();
    let fee_asset = store.get_asset(declared.asset_id)?;
    let required = store.fee_schedule().required_fee(op, fee_asset)?;
    ensure!(
        declared.asset_id == required.asset_id,
        ValidationError::WrongFeeAsset {
            declared: declared.asset_id,
            required: required.asset_id,
        }
    );
    ensure!(
        declared.amount >= required.amount,
        ValidationError::InsufficientFee { declared, required }
    );
    Ok(required)
}

/// Payer must hold the declared fee plus everything else `apply` takes from
/// it in the fee asset
fn check_solvency<S: LedgerStore>(store: &S, op: &Operation, receipt: &Receipt) -> Result<()> {
    let payer = op.fee_payer();
    let fee = op.fee();
    if fee.amount == 0 {
        return Ok(());
    }

    let mut required = fee.amount;
    if let Some((account, principal)) = op.principal_debit() {
        if account == payer && principal.asset_id == fee.asset_id {
            required = required.saturating_add(principal.amount);
        }
    }
    if let Some(extra) = receipt.extra_debit() {
        if extra.asset_id == fee.asset_id {
            required = required.saturating_add(extra.amount);
        }
    }

    let balance = store.get_balance(payer, fee.asset_id);
    ensure!(
        balance.amount >= required,
        ValidationError::InsufficientBalance {
            account: store.get_account(payer)?.name.clone(),
            balance,
            required: Asset::new(required, fee.asset_id),
        }
    );
    Ok(())
}

/// Evaluate one operation without side effects
pub fn evaluate_operation<S: LedgerStore>(store: &S, op: &Operation) -> Result<EvaluatedOperation> {
    op.validate()?;
    store.get_account(op.fee_payer())?;
    let required_fee = check_fee(store, op)?;

    let context = EvalContext::resolve(store);
    let receipt = evaluator::evaluate(store, &context, op)?;
    check_solvency(store, op, &receipt)?;

    Ok(EvaluatedOperation {
        context,
        required_fee,
        receipt,
    })
}

/// Deduct the declared fee from the payer and accumulate it on the fee asset
pub fn pay_fee<S: LedgerStore>(store: &mut S, op: &Operation) -> Result<()> {
    let fee = op.fee();
    if fee.amount == 0 {
        return Ok(());
    }
    store.adjust_balance(op.fee_payer(), -fee)?;
    store.modify_asset_dynamic_data(fee.asset_id, |data| {
        data.accumulated_fees += fee.amount;
    })
}

/// Apply an evaluated operation: charge the fee, then run the evaluator
pub fn apply_operation<S: LedgerStore>(
    store: &mut S,
    op: &Operation,
    evaluated: EvaluatedOperation,
) -> Result<OperationResult> {
    pay_fee(store, op)?;
    evaluator::apply(store, &evaluated.context, op, evaluated.receipt)
}

/// Apply a transaction all-or-nothing
///
/// On failure the store is left untouched.
pub fn push_transaction<S>(store: &mut S, trx: &Transaction) -> Result<ProcessedTransaction>
where
    S: LedgerStore + AuthorityOracle,
{
    ensure!(
        !trx.operations.is_empty(),
        ValidationError::invalid("transaction has no operations")
    );
    let trx_id = trx.id()?;

    if trx.signing_keys.is_empty() {
        ensure!(
            !store.chain_parameters().require_signatures,
            ValidationError::MissingAuthority {
                account: trx.operations[0].fee_payer().to_string(),
                level: "active",
            }
        );
    } else {
        let mut required = RequiredAuthorities::default();
        for op in &trx.operations {
            op.add_required_authorities(&mut required);
        }
        verify_authority(store, &required, &trx.signing_keys)?;
    }

    store.begin_undo_session()?;
    let mut results = Vec::with_capacity(trx.operations.len());
    for (op_in_trx, op) in trx.operations.iter().enumerate() {
        let outcome = evaluate_operation(&*store, op)
            .and_then(|evaluated| apply_operation(store, op, evaluated));
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                store.undo_session();
                log_rejection(&trx_id, op_in_trx, op, &e);
                return Err(e);
            }
        }
    }

    store.commit_undo_session();
    tracing::info!(
        trx_id = %trx_id,
        operations = results.len(),
        "Transaction applied"
    );
    Ok(ProcessedTransaction { trx_id, results })
}

fn log_rejection(trx_id: &str, op_in_trx: usize, op: &Operation, e: &Error) {
    if e.is_validation() {
        tracing::warn!(trx_id, op_in_trx, op = op.name(), error = %e, "Transaction rejected");
    } else {
        tracing::error!(trx_id, op_in_trx, op = op.name(), error = %e, "Transaction failed");
    }
}
