//! Read-only database queries
//!
//! Every query takes a shared read guard on the chain store, so queries run
//! concurrently with each other and never observe a half-applied
//! transaction.

use crate::config::ApiConfig;
use crate::{Error, Result};
use chain_core::cheque::{self, ChequeInfo, ChequeObject};
use chain_core::fee;
use chain_core::objects::{AccountObject, AssetObject};
use chain_core::operations::{
    BlindTransfer2Operation, ChequeCreateOperation, Operation, TransferOperation,
};
use chain_core::types::{AccountId, Asset, AssetId, ChequeId};
use chain_core::{EvalContext, InMemoryStore, LedgerStore, ValidationError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Fee quote with display metadata of the fee asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFeeInfo {
    /// Fee to declare
    pub amount: Asset,
    /// Symbol of the fee asset
    pub name: String,
    /// Precision of the fee asset
    pub precision: u8,
}

impl TransferFeeInfo {
    fn new(amount: Asset, asset: &AssetObject) -> Self {
        Self {
            amount,
            name: asset.symbol.clone(),
            precision: asset.precision,
        }
    }
}

/// Query facade over the shared chain store
#[derive(Debug, Clone)]
pub struct DatabaseApi {
    store: Arc<RwLock<InMemoryStore>>,
    config: ApiConfig,
}

impl DatabaseApi {
    /// Create a query facade over `store`
    pub fn new(store: Arc<RwLock<InMemoryStore>>, config: ApiConfig) -> Self {
        Self { store, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Accounts
    // ---------------------------------------------------------------------

    /// Account by name
    pub fn get_account_by_name(&self, name: &str) -> Option<AccountObject> {
        self.store.read().find_account_by_name(name).cloned()
    }

    /// Balances of an account
    ///
    /// With an empty `assets` list every non-zero balance is returned;
    /// otherwise one entry per requested asset, zero when the account holds
    /// none.
    pub fn get_account_balances(&self, account: AccountId, assets: &[AssetId]) -> Result<Vec<Asset>> {
        let store = self.store.read();
        store.get_account(account)?;
        if assets.is_empty() {
            return Ok(store.balances_of(account));
        }
        Ok(assets
            .iter()
            .map(|asset| store.get_balance(account, *asset))
            .collect())
    }

    // ---------------------------------------------------------------------
    // Cheques
    // ---------------------------------------------------------------------

    /// Redemption summary of the cheque with this code
    pub fn get_cheque_by_code(&self, code: &str) -> Result<ChequeInfo> {
        let store = self.store.read();
        let cheque = cheque::find_cheque_by_code(&*store, code)?;
        Ok(ChequeInfo::from(cheque))
    }

    /// Cheques drawn by `drawer`, ordered by id, starting at `from`
    ///
    /// Redemption codes are cleared from the returned objects.
    pub fn get_account_cheques(
        &self,
        drawer: AccountId,
        from: Option<ChequeId>,
        limit: usize,
    ) -> Result<Vec<ChequeObject>> {
        if limit > self.config.max_page_size {
            return Err(Error::InvalidRequest(format!(
                "limit {} exceeds maximum page size {}",
                limit, self.config.max_page_size
            )));
        }

        let store = self.store.read();
        store.get_account(drawer)?;
        let from = from.map(|id| id.instance()).unwrap_or(0);
        Ok(store
            .cheques_by_drawer(drawer)
            .into_iter()
            .filter(|cheque| cheque.id.instance() >= from)
            .take(limit)
            .map(|cheque| ChequeObject {
                code: String::new(),
                ..cheque.clone()
            })
            .collect())
    }

    // ---------------------------------------------------------------------
    // Fees
    // ---------------------------------------------------------------------

    /// Flat fees of `ops` denominated in `asset`
    ///
    /// Each entry is the fee as JSON. A proposal yields
    /// `[proposal_fee, [nested fees...]]`, recursing into nested proposals up
    /// to the configured depth.
    pub fn get_required_fees(&self, ops: &[Operation], asset: AssetId) -> Result<Vec<Value>> {
        let store = self.store.read();
        let asset = store.get_asset(asset)?;
        let quoter = FeeQuoter {
            store: &*store,
            asset,
            max_recursion: self.config.max_fee_recursion,
        };
        ops.iter().map(|op| quoter.op_fee(op, 0)).collect()
    }

    /// Fee to declare on a transfer of `amount`
    ///
    /// The custom percent fee when it applies, never less than the flat
    /// fee converted into the transferred asset.
    pub fn get_required_transfer_fee(
        &self,
        amount: Asset,
        from: AccountId,
        to: AccountId,
    ) -> Result<TransferFeeInfo> {
        let store = self.store.read();
        let ctx = EvalContext::resolve(&*store);
        let op: Operation = TransferOperation {
            fee: Asset::zero(amount.asset_id),
            from,
            to,
            amount,
            memo: None,
        }
        .into();

        let custom = fee::transfer_custom_fee(store.settings(), ctx.epoch, amount)?;
        let required = match custom {
            Some(custom) => at_least_flat_fee(&*store, &op, custom)?,
            None => flat_fee_in(&*store, &op, amount.asset_id)?,
        };
        fee_info(&*store, required)
    }

    /// Fee to declare on a blind transfer of `amount`
    ///
    /// Before custom fees are active the blind fee is charged on top of the
    /// declared fee, so only the flat fee is quoted.
    pub fn get_required_blind_transfer_fee(
        &self,
        amount: Asset,
        from: AccountId,
        to: AccountId,
    ) -> Result<TransferFeeInfo> {
        let store = self.store.read();
        let ctx = EvalContext::resolve(&*store);
        let op: Operation = BlindTransfer2Operation {
            fee: Asset::zero(amount.asset_id),
            from,
            to,
            amount,
            memo: None,
        }
        .into();

        let required = if ctx.epoch.custom_fees {
            let custom = fee::blind_transfer_fee(store.settings(), ctx.epoch, amount)?;
            at_least_flat_fee(&*store, &op, custom)?
        } else {
            flat_fee_in(&*store, &op, amount.asset_id)?
        };
        fee_info(&*store, required)
    }

    /// Fee to declare on a cheque of `count` slots paying `amount` each
    pub fn get_required_cheque_fee(
        &self,
        amount: Asset,
        count: u32,
        account: AccountId,
    ) -> Result<TransferFeeInfo> {
        let store = self.store.read();
        let op: Operation = ChequeCreateOperation {
            fee: Asset::zero(amount.asset_id),
            account_id: account,
            code: String::new(),
            payee_amount: amount,
            payee_count: count,
            expiration_datetime: store.head_block_time(),
        }
        .into();
        let required = flat_fee_in(&*store, &op, amount.asset_id)?;
        fee_info(&*store, required)
    }
}

/// Flat fee of `op` in `asset`, falling back to the core asset when `asset`
/// has no usable exchange rate
fn flat_fee_in<S: LedgerStore>(store: &S, op: &Operation, asset: AssetId) -> Result<Asset> {
    let fee_asset = store.get_asset(asset)?;
    match store.fee_schedule().required_fee(op, fee_asset) {
        Ok(fee) => Ok(fee),
        Err(ValidationError::InvalidOperation(_)) => Ok(store.fee_schedule().core_fee(op)),
        Err(err) => Err(err.into()),
    }
}

/// The larger of `custom` and the flat fee in the same asset
fn at_least_flat_fee<S: LedgerStore>(store: &S, op: &Operation, custom: Asset) -> Result<Asset> {
    let fee_asset = store.get_asset(custom.asset_id)?;
    let flat = store.fee_schedule().required_fee(op, fee_asset)?;
    Ok(Asset::new(custom.amount.max(flat.amount), custom.asset_id))
}

fn fee_info<S: LedgerStore>(store: &S, amount: Asset) -> Result<TransferFeeInfo> {
    let asset = store.get_asset(amount.asset_id)?;
    Ok(TransferFeeInfo::new(amount, asset))
}

/// Walks nested proposals with an explicit depth counter
struct FeeQuoter<'a, S> {
    store: &'a S,
    asset: &'a AssetObject,
    max_recursion: u32,
}

impl<S: LedgerStore> FeeQuoter<'_, S> {
    fn op_fee(&self, op: &Operation, depth: u32) -> Result<Value> {
        let fee = self.store.fee_schedule().required_fee(op, self.asset)?;
        let Operation::ProposalCreate(proposal) = op else {
            return Ok(serde_json::to_value(fee)?);
        };

        let mut nested = Vec::with_capacity(proposal.proposed_ops.len());
        for proposed in &proposal.proposed_ops {
            if depth >= self.max_recursion {
                return Err(ValidationError::RecursionLimitExceeded {
                    max_depth: self.max_recursion,
                }
                .into());
            }
            nested.push(self.op_fee(&proposed.op, depth + 1)?);
        }
        Ok(json!([fee, nested]))
    }
}
