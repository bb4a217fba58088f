//! Transfer family evaluators
//!
//! Plain, blind and override transfers share the same party checks, run in
//! this order and failing fast:
//!
//! 1. sender authorized by the asset whitelist
//! 2. receiver authorized by the asset whitelist
//! 3. sender not restricted from paying
//! 4. receiver not restricted from receiving
//! 5. transfer-restricted assets must involve the issuer
//!
//! A receiver in burn mode is never credited; the asset supply shrinks by
//! the transferred amount instead. A fee the sender pays in the transferred
//! asset is burned with it rather than collected.

use super::{EvalContext, Evaluator};
use crate::error::{ensure, Result, ValidationError};
use crate::fee::{blind_transfer_fee, transfer_custom_fee};
use crate::objects::{AccountObject, AssetObject, BlindTransferObject, Directionality};
use crate::operations::{
    BlindTransfer2Operation, OverrideTransferOperation, TransferOperation,
    UpdateBlindTransfer2SettingsOperation,
};
use crate::store::LedgerStore;
use crate::transaction::OperationResult;
use crate::types::{AccountId, Asset, ShareType, COMMITTEE_ACCOUNT};

/// Whether an account may hold and move an asset
///
/// Only assets with the whitelist flag are checked: the account must not be
/// blacklisted by any of the asset's blacklist authorities and must be
/// whitelisted by at least one of its whitelist authorities, if it has any.
pub fn is_authorized_asset(account: &AccountObject, asset: &AssetObject) -> bool {
    if !asset.enforces_white_list() {
        return true;
    }
    if account
        .blacklisting_accounts
        .iter()
        .any(|id| asset.options.blacklist_authorities.contains(id))
    {
        return false;
    }
    if asset.options.whitelist_authorities.is_empty() {
        return true;
    }
    account
        .whitelisting_accounts
        .iter()
        .any(|id| asset.options.whitelist_authorities.contains(id))
}

/// Whether no committee restriction blocks `account` in `direction`
pub fn not_restricted_account<S: LedgerStore>(
    store: &S,
    account: AccountId,
    direction: Directionality,
) -> bool {
    store
        .find_restriction(account)
        .map_or(true, |restriction| !restriction.blocks(direction))
}

/// Objects resolved by the shared party checks
struct Parties<'a> {
    from: &'a AccountObject,
    to: &'a AccountObject,
    asset: &'a AssetObject,
}

fn check_parties<'a, S: LedgerStore>(
    store: &'a S,
    from: AccountId,
    to: AccountId,
    amount: Asset,
) -> Result<Parties<'a>> {
    let from = store.get_account(from)?;
    let to = store.get_account(to)?;
    let asset = store.get_asset(amount.asset_id)?;

    ensure!(
        is_authorized_asset(from, asset),
        ValidationError::FromAccountNotWhitelisted {
            from: from.name.clone(),
            asset: asset.id,
        }
    );
    ensure!(
        is_authorized_asset(to, asset),
        ValidationError::ToAccountNotWhitelisted {
            to: to.name.clone(),
            asset: asset.id,
        }
    );
    ensure!(
        not_restricted_account(store, from.id, Directionality::Payer),
        ValidationError::FromAccountRestricted {
            from: from.name.clone()
        }
    );
    ensure!(
        not_restricted_account(store, to.id, Directionality::Receiver),
        ValidationError::ToAccountRestricted { to: to.name.clone() }
    );
    if asset.is_transfer_restricted() {
        ensure!(
            from.id == asset.issuer || to.id == asset.issuer,
            ValidationError::TransferRestrictedAsset { asset: asset.id }
        );
    }

    Ok(Parties { from, to, asset })
}

/// Reject when the reserve-asset daily volume would be exceeded
fn check_daily_limit<S: LedgerStore>(
    store: &S,
    ctx: &EvalContext,
    from: &AccountObject,
    amount: Asset,
) -> Result<()> {
    if !ctx.epoch.daily_limit
        || amount.asset_id != store.chain_parameters().reserve_asset
        || !from.edc_limit_daily_volume_enabled
    {
        return Ok(());
    }
    let limit = store.settings().edc_transfers_daily_limit;
    let counter = from.edc_transfers_daily_amount_counter;
    let exceeded = counter
        .checked_add(amount.amount)
        .map_or(true, |total| total > limit);
    ensure!(
        !exceeded,
        ValidationError::DailyLimitExceeded {
            counter,
            amount: amount.amount,
            limit,
        }
    );
    Ok(())
}

fn check_balance<S: LedgerStore>(
    store: &S,
    account: &AccountObject,
    required: Asset,
) -> Result<()> {
    let balance = store.get_balance(account.id, required.asset_id);
    ensure!(
        balance.amount >= required.amount,
        ValidationError::InsufficientBalance {
            account: account.name.clone(),
            balance,
            required,
        }
    );
    Ok(())
}

fn checked_total(amount: Asset, fee: ShareType) -> Result<Asset> {
    let total = amount
        .amount
        .checked_add(fee)
        .ok_or_else(|| ValidationError::invalid("transfer amount overflow"))?;
    Ok(Asset::new(total, amount.asset_id))
}

/// Burn-mode receivers only accept assets whose supply can shrink
fn check_burn<S: LedgerStore>(store: &S, parties: &Parties<'_>, burned: ShareType) -> Result<()> {
    if !parties.to.burning_mode_enabled {
        return Ok(());
    }
    ensure!(
        !parties.asset.is_market_issued(),
        ValidationError::BurnMarketIssuedAsset {
            symbol: parties.asset.symbol.clone()
        }
    );
    let supply = store.get_asset_dynamic_data(parties.asset.id)?.current_supply;
    ensure!(
        supply.checked_sub(burned).map_or(false, |left| left >= 0),
        ValidationError::BurnSupplyUnderflow {
            asset: parties.asset.id,
            supply,
            burn: burned,
        }
    );
    Ok(())
}

/// Declared fee must cover a non-zero custom fee, in the same asset
fn check_declared_fee(declared: Asset, custom_fee: Asset) -> Result<()> {
    if custom_fee.amount <= 0 {
        return Ok(());
    }
    ensure!(
        declared.asset_id == custom_fee.asset_id,
        ValidationError::WrongFeeAsset {
            declared: declared.asset_id,
            required: custom_fee.asset_id,
        }
    );
    ensure!(
        declared.amount >= custom_fee.amount,
        ValidationError::InsufficientFee {
            declared,
            required: custom_fee,
        }
    );
    Ok(())
}

/// Move the principal: debit the sender, then credit the receiver or burn
fn move_principal<S: LedgerStore>(
    store: &mut S,
    from: AccountId,
    to: AccountId,
    amount: Asset,
    burn: bool,
) -> Result<()> {
    store.adjust_balance(from, -amount)?;
    if burn {
        store.modify_asset_dynamic_data(amount.asset_id, |data| {
            data.current_supply -= amount.amount;
        })?;
        tracing::debug!(to = %to, amount = %amount, "Transfer burned by receiver");
    } else {
        store.adjust_balance(to, amount)?;
    }
    Ok(())
}

/// Declared fee burned alongside the principal
fn fee_burned_with(parties: &Parties<'_>, declared: Asset, amount: Asset) -> ShareType {
    if parties.to.burning_mode_enabled && declared.asset_id == amount.asset_id {
        declared.amount
    } else {
        0
    }
}

/// Move a fee already collected by the processor out of the supply
///
/// The processor charges the declared fee before running `apply`.
fn burn_collected_fee<S: LedgerStore>(store: &mut S, fee: Asset) -> Result<()> {
    if fee.amount == 0 {
        return Ok(());
    }
    store.modify_asset_dynamic_data(fee.asset_id, |data| {
        data.accumulated_fees -= fee.amount;
        data.current_supply -= fee.amount;
    })
}

fn count_daily_volume<S: LedgerStore>(store: &mut S, from: AccountId, amount: Asset) -> Result<()> {
    store.modify_account(from, |account| {
        account.edc_transfers_daily_amount_counter += amount.amount;
    })
}

fn counts_daily_volume<S: LedgerStore>(store: &S, ctx: &EvalContext, amount: Asset) -> bool {
    ctx.epoch.daily_limit && amount.asset_id == store.chain_parameters().reserve_asset
}

/// Receipt of plain and override transfers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Percent fee the declared fee had to cover
    pub custom_fee: Option<Asset>,
    /// Receiver burns incoming transfers
    pub burn: bool,
    /// Collected fee burned with the principal
    pub burned_fee: ShareType,
    /// Amount counts towards the sender's daily volume
    pub count_daily: bool,
}

/// Evaluator for [`TransferOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferEvaluator;

impl Evaluator for TransferEvaluator {
    type Op = TransferOperation;
    type Receipt = TransferReceipt;

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        ctx: &EvalContext,
        op: &TransferOperation,
    ) -> Result<TransferReceipt> {
        let parties = check_parties(store, op.from, op.to, op.amount)?;
        check_daily_limit(store, ctx, parties.from, op.amount)?;

        let custom_fee = transfer_custom_fee(store.settings(), ctx.epoch, op.amount)?;
        let fee_amount = custom_fee.map_or(0, |fee| fee.amount);
        let total = checked_total(op.amount, fee_amount)?;
        check_balance(store, parties.from, total)?;
        if let Some(fee) = custom_fee {
            check_declared_fee(op.fee, fee)?;
        }

        let burned_fee = fee_burned_with(&parties, op.fee, op.amount);
        let burned = checked_total(op.amount, burned_fee)?;
        check_burn(store, &parties, burned.amount)?;

        Ok(TransferReceipt {
            custom_fee,
            burn: parties.to.burning_mode_enabled,
            burned_fee,
            count_daily: counts_daily_volume(store, ctx, op.amount),
        })
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &TransferOperation,
        receipt: TransferReceipt,
    ) -> Result<OperationResult> {
        move_principal(store, op.from, op.to, op.amount, receipt.burn)?;
        burn_collected_fee(store, Asset::new(receipt.burned_fee, op.amount.asset_id))?;
        if receipt.count_daily {
            count_daily_volume(store, op.from, op.amount)?;
        }
        Ok(OperationResult::Void)
    }
}

/// Receipt of a blind transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindTransferReceipt {
    /// Fee charged for the transfer
    pub custom_fee: Asset,
    /// Fee is deducted and burned by `apply` (before the fee policy epoch)
    pub burn_fee: bool,
    /// Receiver burns incoming transfers
    pub burn: bool,
    /// Collected fee burned with the principal
    pub burned_fee: ShareType,
    /// Amount counts towards the sender's daily volume
    pub count_daily: bool,
}

/// Evaluator for [`BlindTransfer2Operation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BlindTransfer2Evaluator;

impl Evaluator for BlindTransfer2Evaluator {
    type Op = BlindTransfer2Operation;
    type Receipt = BlindTransferReceipt;

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        ctx: &EvalContext,
        op: &BlindTransfer2Operation,
    ) -> Result<BlindTransferReceipt> {
        let parties = check_parties(store, op.from, op.to, op.amount)?;
        check_daily_limit(store, ctx, parties.from, op.amount)?;

        let custom_fee = blind_transfer_fee(store.settings(), ctx.epoch, op.amount)?;
        store.get_asset_dynamic_data(custom_fee.asset_id)?;

        let same_asset = custom_fee.asset_id == op.amount.asset_id;
        let total = if same_asset {
            checked_total(op.amount, custom_fee.amount)?
        } else {
            op.amount
        };
        check_balance(store, parties.from, total)?;
        if !same_asset {
            check_balance(store, parties.from, custom_fee)?;
        }

        if ctx.epoch.custom_fees {
            check_declared_fee(op.fee, custom_fee)?;
        }

        let burn_fee = !ctx.epoch.custom_fees && custom_fee.amount > 0;
        let burned_fee = fee_burned_with(&parties, op.fee, op.amount);
        let mut burned = checked_total(op.amount, burned_fee)?;
        if burn_fee && same_asset {
            burned = checked_total(burned, custom_fee.amount)?;
        }
        check_burn(store, &parties, burned.amount)?;

        Ok(BlindTransferReceipt {
            custom_fee,
            burn_fee,
            burn: parties.to.burning_mode_enabled,
            burned_fee,
            count_daily: counts_daily_volume(store, ctx, op.amount),
        })
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        ctx: &EvalContext,
        op: &BlindTransfer2Operation,
        receipt: BlindTransferReceipt,
    ) -> Result<OperationResult> {
        let fee = receipt.custom_fee;
        if receipt.burn_fee {
            store.adjust_balance(op.from, -fee)?;
            store.modify_asset_dynamic_data(fee.asset_id, |data| {
                data.current_supply -= fee.amount;
            })?;
        }
        if receipt.count_daily {
            count_daily_volume(store, op.from, op.amount)?;
        }
        move_principal(store, op.from, op.to, op.amount, receipt.burn)?;
        burn_collected_fee(store, Asset::new(receipt.burned_fee, op.amount.asset_id))?;

        store.create_blind_transfer(BlindTransferObject {
            from: op.from,
            to: op.to,
            amount: op.amount,
            fee: fee.amount,
            memo: op.memo.clone(),
            datetime: ctx.now,
            ..Default::default()
        })?;

        Ok(OperationResult::Asset(fee))
    }
}

/// Evaluator for [`OverrideTransferOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideTransferEvaluator;

impl Evaluator for OverrideTransferEvaluator {
    type Op = OverrideTransferOperation;
    type Receipt = TransferReceipt;

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &OverrideTransferOperation,
    ) -> Result<TransferReceipt> {
        let asset = store.get_asset(op.amount.asset_id)?;
        ensure!(
            asset.can_override(),
            ValidationError::OverrideTransferNotPermitted { asset: asset.id }
        );
        ensure!(
            asset.issuer == op.issuer,
            ValidationError::Unauthorized {
                account: op.issuer.to_string(),
                reason: format!("not the issuer of {}", asset.symbol),
            }
        );

        let parties = check_parties(store, op.from, op.to, op.amount)?;
        check_balance(store, parties.from, op.amount)?;
        check_burn(store, &parties, op.amount.amount)?;

        Ok(TransferReceipt {
            custom_fee: None,
            burn: parties.to.burning_mode_enabled,
            burned_fee: 0,
            count_daily: false,
        })
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &OverrideTransferOperation,
        receipt: TransferReceipt,
    ) -> Result<OperationResult> {
        move_principal(store, op.from, op.to, op.amount, receipt.burn)?;
        Ok(OperationResult::Void)
    }
}

/// Evaluator for [`UpdateBlindTransfer2SettingsOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateBlindTransfer2SettingsEvaluator;

impl Evaluator for UpdateBlindTransfer2SettingsEvaluator {
    type Op = UpdateBlindTransfer2SettingsOperation;
    type Receipt = ();

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &UpdateBlindTransfer2SettingsOperation,
    ) -> Result<()> {
        ensure!(
            op.issuer == COMMITTEE_ACCOUNT,
            ValidationError::Unauthorized {
                account: op.issuer.to_string(),
                reason: "only the committee may change blind transfer settings".to_string(),
            }
        );
        store.get_asset(op.blind_fee.asset_id)?;
        Ok(())
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &UpdateBlindTransfer2SettingsOperation,
        _receipt: (),
    ) -> Result<OperationResult> {
        store.modify_settings(|settings| {
            settings.blind_transfer_default_fee = op.blind_fee;
        })?;
        Ok(OperationResult::Void)
    }
}
