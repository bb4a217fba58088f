//! Impact analysis
//!
//! Maps an operation to the accounts and funds whose history it belongs to.
//! The fee payer is not included here; history indexing adds it separately.
//!
//! A few operations only name a fund deposit. Resolving the deposit's owner
//! (or its fund's owner) needs the ledger, so those arms contribute nothing
//! when no store is supplied or the deposit no longer exists.

use chain_core::operations::Operation;
use chain_core::types::{AccountId, Authority, FundDepositId, FundId, ALPHA_ACCOUNT};
use chain_core::{InMemoryStore, LedgerStore, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Accounts and funds touched by an operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactedItems {
    /// Impacted accounts
    pub accounts: BTreeSet<AccountId>,
    /// Impacted funds
    pub funds: BTreeSet<FundId>,
}

impl ImpactedItems {
    /// Nothing impacted
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.funds.is_empty()
    }

    /// Union another set into this one
    pub fn extend(&mut self, other: ImpactedItems) {
        self.accounts.extend(other.accounts);
        self.funds.extend(other.funds);
    }

    fn account(&mut self, id: AccountId) {
        self.accounts.insert(id);
    }

    fn fund(&mut self, id: FundId) {
        self.funds.insert(id);
    }

    fn authority(&mut self, authority: &Authority) {
        self.accounts.extend(authority.account_auths.keys().copied());
    }
}

/// Accounts and funds impacted by one operation
///
/// `store` resolves deposit owners; pass `None` for a purely syntactic
/// answer.
pub fn get_impacted_items<S: LedgerStore>(op: &Operation, store: Option<&S>) -> ImpactedItems {
    let mut items = ImpactedItems::default();
    collect(op, store, &mut items);
    items
}

/// [`get_impacted_items`] without ledger lookups
pub fn get_impacted_items_stateless(op: &Operation) -> ImpactedItems {
    get_impacted_items::<InMemoryStore>(op, None)
}

/// Union of the items impacted by every operation of a transaction
pub fn transaction_impacted_items<S: LedgerStore>(
    trx: &Transaction,
    store: Option<&S>,
) -> ImpactedItems {
    let mut items = ImpactedItems::default();
    for op in &trx.operations {
        collect(op, store, &mut items);
    }
    items
}

fn deposit_owner<S: LedgerStore>(store: Option<&S>, id: FundDepositId) -> Option<AccountId> {
    store?.find_fund_deposit(id).map(|deposit| deposit.account_id)
}

fn deposit_fund_owner<S: LedgerStore>(store: Option<&S>, id: FundDepositId) -> Option<AccountId> {
    let store = store?;
    let deposit = store.find_fund_deposit(id)?;
    store.find_fund(deposit.fund_id).map(|fund| fund.owner)
}

fn collect<S: LedgerStore>(op: &Operation, store: Option<&S>, items: &mut ImpactedItems) {
    use Operation::*;

    match op {
        Transfer(op) => items.account(op.to),
        BlindTransfer2(op) => items.account(op.to),
        OverrideTransfer(op) => {
            items.account(op.to);
            items.account(op.from);
            items.account(op.issuer);
        }
        TransferToBlind(op) => {
            items.account(op.from);
            for out in &op.outputs {
                items.authority(&out.owner);
            }
        }
        BlindTransfer(op) => {
            for input in &op.inputs {
                items.authority(&input.owner);
            }
            for out in &op.outputs {
                items.authority(&out.owner);
            }
        }
        TransferFromBlind(op) => {
            items.account(op.to);
            for input in &op.inputs {
                items.authority(&input.owner);
            }
        }

        LimitOrderCancel(op) => items.account(op.fee_paying_account),
        FillOrder(op) => items.account(op.account_id),
        SetMarket(op) => items.account(op.to_account),

        AccountCreate(op) => {
            items.account(op.registrar);
            items.account(op.referrer);
            items.authority(&op.owner);
            items.authority(&op.active);
        }
        AccountUpdate(op) => {
            items.account(op.account);
            if let Some(owner) = &op.owner {
                items.authority(owner);
            }
            if let Some(active) = &op.active {
                items.authority(active);
            }
        }
        AccountUpdateAuthorities(op) => {
            items.account(op.account);
            if let Some(owner) = &op.owner {
                items.authority(owner);
            }
            if let Some(active) = &op.active {
                items.authority(active);
            }
        }
        AccountWhitelist(op) => items.account(op.account_to_list),
        AccountRestrict(op) => items.account(op.target),
        AccountAllowRegistrar(op) => items.account(op.target),
        SetVerificationIsRequired(op) => items.account(op.target),
        SetBurningMode(op) => items.account(op.account_id),
        AccountTransfer(op) => items.account(op.new_owner),
        AccountEdcLimitDailyVolume(op) => items.account(op.account_id),
        UpdateAccountsReferrer(op) => items.accounts.extend(op.accounts.iter().copied()),
        EnableAccountReferralPayments(op) => items.account(op.account_id),

        AssetUpdate(op) => {
            if let Some(issuer) = op.new_issuer {
                items.account(issuer);
            }
        }
        AssetUpdate2(op) => {
            if let Some(issuer) = op.new_issuer {
                items.account(issuer);
            }
        }
        AssetIssue(op) => items.account(op.issue_to_account),
        ReferralIssue(op) => items.account(op.issue_to_account),
        DailyIssue(op) => items.account(op.issue_to_account),
        AssetSettleCancel(op) => items.account(op.account),
        FbaDistribute(op) => items.account(op.account_id),
        Denominate(op) => items.account(op.issuer),

        FundCreate(op) => items.account(op.owner),
        FundUpdate(op) => {
            items.account(op.from_account);
            items.fund(op.id);
        }
        FundRefill(op) => {
            items.account(op.from_account);
            items.fund(op.id);
        }
        FundDeposit(op) => {
            items.account(op.from_account);
            items.fund(op.fund_id);
        }
        FundWithdrawal(op) => {
            items.account(op.issue_to_account);
            items.fund(op.fund_id);
        }
        FundPayment(op) => {
            items.account(op.issue_to_account);
            items.fund(op.fund_id);
        }
        FundSetEnable(op) => items.fund(op.id),
        FundDepositSetEnable(op) => {
            if let Some(owner) = deposit_owner(store, op.deposit_id) {
                items.account(owner);
            }
        }
        FundRemove(_) => items.account(ALPHA_ACCOUNT),
        FundChangePaymentScheme(op) => {
            items.account(ALPHA_ACCOUNT);
            items.fund(op.id);
        }
        EnableAutorenewalDeposits(op) => items.account(op.account_id),
        DepositRenewal(op) => items.account(op.account_id),
        FundDepositUpdate(op) => {
            if let Some(owner) = deposit_fund_owner(store, op.deposit_id) {
                items.account(owner);
            }
        }
        FundDepositUpdate2(op) => {
            if let Some(owner) = deposit_fund_owner(store, op.deposit_id) {
                items.account(owner);
            }
        }
        FundDepositReduce(op) => {
            if let Some(owner) = deposit_owner(store, op.deposit_id) {
                items.account(owner);
            }
        }

        ChequeCreate(op) => items.account(op.account_id),
        ChequeUse(op) => items.account(op.account_id),
        ChequeReverse(op) => items.account(op.account_id),

        WitnessCreate(op) => items.account(op.witness_account),
        WitnessUpdate(op) => items.account(op.witness_account),
        SetWitnessException(op) => items.account(op.issuer),
        CommitteeMemberCreate(op) => items.account(op.committee_member_account),
        CommitteeMemberUpdate(op) => items.account(op.committee_member_account),

        ProposalCreate(op) => {
            for proposed in &op.proposed_ops {
                let required = proposed.op.required_authorities();
                items.accounts.extend(required.active);
                items.accounts.extend(required.owner);
                for other in &required.other {
                    items.authority(other);
                }
            }
        }

        WithdrawPermissionCreate(op) => items.account(op.authorized_account),
        WithdrawPermissionUpdate(op) => items.account(op.authorized_account),
        WithdrawPermissionClaim(op) => items.account(op.withdraw_from_account),
        WithdrawPermissionDelete(op) => items.account(op.authorized_account),
        VestingBalanceCreate(op) => items.account(op.owner),

        UpdateBlindTransfer2Settings(_)
        | UpdateSettings(_)
        | AssetClaimFees(_)
        | LimitOrderCreate(_)
        | CallOrderUpdate(_)
        | AddAddress(_)
        | SetOnlineTime(_)
        | AllowCreateAddresses(_)
        | AssetsUpdateFeePayer(_)
        | AssetUpdateExchangeRate(_)
        | AccountUpgrade(_)
        | AssetCreate(_)
        | AllowCreateAsset(_)
        | AssetUpdateBitasset(_)
        | AssetUpdateFeedProducers(_)
        | Bonus(_)
        | AssetReserve(_)
        | AssetFundFeePool(_)
        | EdcAssetFundFeePool(_)
        | AssetSettle(_)
        | AssetGlobalSettle(_)
        | AssetPublishFeed(_)
        | ProposalUpdate(_)
        | ProposalDelete(_)
        | CommitteeMemberUpdateGlobalParameters(_)
        | VestingBalanceWithdraw(_)
        | WorkerCreate(_)
        | Custom(_)
        | Assert(_)
        | BalanceClaim(_)
        | CreateMarketAddress(_)
        | UpdateReferralSettings(_) => {}
    }
}
