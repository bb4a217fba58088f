//! Operation catalog
//!
//! An [`Operation`] is a single ledger-mutation request. Operations are
//! immutable once constructed; evaluators read them and never modify them.
//! Every operation kind carries a declared `fee` and names the account that
//! pays it.
//!
//! Per-kind behaviour that does not need chain state (fee payer, stateless
//! field validation, required authorities) lives on [`BaseOperation`].
//! Everything else dispatches with a single exhaustive `match` over
//! [`Operation`].

use crate::error::ValidationError;
use crate::types::{AccountId, Asset, Authority};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Authorities an operation requires
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredAuthorities {
    /// Accounts whose active (or owner) authority must sign
    pub active: BTreeSet<AccountId>,
    /// Accounts whose owner authority must sign
    pub owner: BTreeSet<AccountId>,
    /// Standalone authorities (blind inputs, balance owners)
    pub other: Vec<Authority>,
}

/// State-independent behaviour shared by all operation kinds
pub trait BaseOperation {
    /// Declared fee
    fn fee(&self) -> Asset;

    /// Account paying the fee
    fn fee_payer(&self) -> AccountId;

    /// Stateless field validation
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Add the authorities this operation requires
    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.active.insert(self.fee_payer());
    }
}

/// Implements [`BaseOperation`] for operations whose fee payer is a field
/// and that need no extra validation.
macro_rules! base_operation {
    ($ty:ty, $payer:ident) => {
        impl $crate::operations::BaseOperation for $ty {
            fn fee(&self) -> $crate::types::Asset {
                self.fee
            }

            fn fee_payer(&self) -> $crate::types::AccountId {
                self.$payer
            }
        }
    };
}

pub(crate) use base_operation;

/// Fail stateless validation unless `cond` holds
pub(crate) fn check(cond: bool, msg: &str) -> Result<(), ValidationError> {
    if cond {
        Ok(())
    } else {
        Err(ValidationError::invalid(msg))
    }
}

mod account;
mod asset;
mod cheque;
mod fund;
mod governance;
mod market;
mod transfer;

pub use account::*;
pub use asset::*;
pub use cheque::*;
pub use fund::*;
pub use governance::*;
pub use market::*;
pub use transfer::*;

macro_rules! operations {
    ($($variant:ident($ty:ty) => $name:literal,)*) => {
        /// Tagged variant over every operation kind
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Operation {
            $(
                #[doc = concat!("`", $name, "` operation")]
                $variant($ty),
            )*
        }

        impl Operation {
            /// Stable snake_case name of the operation kind
            pub fn name(&self) -> &'static str {
                match self {
                    $(Operation::$variant(_) => $name,)*
                }
            }

            /// Names of every operation kind, in catalog order
            pub fn all_names() -> &'static [&'static str] {
                &[$($name,)*]
            }

            fn as_base(&self) -> &dyn BaseOperation {
                match self {
                    $(Operation::$variant(op) => op,)*
                }
            }
        }

        $(
            impl From<$ty> for Operation {
                fn from(op: $ty) -> Self {
                    Operation::$variant(op)
                }
            }
        )*
    };
}

operations! {
    Transfer(TransferOperation) => "transfer",
    LimitOrderCreate(LimitOrderCreateOperation) => "limit_order_create",
    LimitOrderCancel(LimitOrderCancelOperation) => "limit_order_cancel",
    CallOrderUpdate(CallOrderUpdateOperation) => "call_order_update",
    FillOrder(FillOrderOperation) => "fill_order",
    AccountCreate(AccountCreateOperation) => "account_create",
    AccountUpdate(AccountUpdateOperation) => "account_update",
    AccountWhitelist(AccountWhitelistOperation) => "account_whitelist",
    AccountUpgrade(AccountUpgradeOperation) => "account_upgrade",
    AccountTransfer(AccountTransferOperation) => "account_transfer",
    AssetCreate(AssetCreateOperation) => "asset_create",
    AssetUpdate(AssetUpdateOperation) => "asset_update",
    AssetUpdateBitasset(AssetUpdateBitassetOperation) => "asset_update_bitasset",
    AssetUpdateFeedProducers(AssetUpdateFeedProducersOperation) => "asset_update_feed_producers",
    AssetIssue(AssetIssueOperation) => "asset_issue",
    AssetReserve(AssetReserveOperation) => "asset_reserve",
    AssetFundFeePool(AssetFundFeePoolOperation) => "asset_fund_fee_pool",
    AssetSettle(AssetSettleOperation) => "asset_settle",
    AssetGlobalSettle(AssetGlobalSettleOperation) => "asset_global_settle",
    AssetPublishFeed(AssetPublishFeedOperation) => "asset_publish_feed",
    WitnessCreate(WitnessCreateOperation) => "witness_create",
    WitnessUpdate(WitnessUpdateOperation) => "witness_update",
    ProposalCreate(ProposalCreateOperation) => "proposal_create",
    ProposalUpdate(ProposalUpdateOperation) => "proposal_update",
    ProposalDelete(ProposalDeleteOperation) => "proposal_delete",
    WithdrawPermissionCreate(WithdrawPermissionCreateOperation) => "withdraw_permission_create",
    WithdrawPermissionUpdate(WithdrawPermissionUpdateOperation) => "withdraw_permission_update",
    WithdrawPermissionClaim(WithdrawPermissionClaimOperation) => "withdraw_permission_claim",
    WithdrawPermissionDelete(WithdrawPermissionDeleteOperation) => "withdraw_permission_delete",
    CommitteeMemberCreate(CommitteeMemberCreateOperation) => "committee_member_create",
    CommitteeMemberUpdate(CommitteeMemberUpdateOperation) => "committee_member_update",
    CommitteeMemberUpdateGlobalParameters(CommitteeMemberUpdateGlobalParametersOperation) => "committee_member_update_global_parameters",
    VestingBalanceCreate(VestingBalanceCreateOperation) => "vesting_balance_create",
    VestingBalanceWithdraw(VestingBalanceWithdrawOperation) => "vesting_balance_withdraw",
    WorkerCreate(WorkerCreateOperation) => "worker_create",
    Custom(CustomOperation) => "custom",
    Assert(AssertOperation) => "assert",
    BalanceClaim(BalanceClaimOperation) => "balance_claim",
    OverrideTransfer(OverrideTransferOperation) => "override_transfer",
    TransferToBlind(TransferToBlindOperation) => "transfer_to_blind",
    BlindTransfer(BlindTransferOperation) => "blind_transfer",
    TransferFromBlind(TransferFromBlindOperation) => "transfer_from_blind",
    AssetSettleCancel(AssetSettleCancelOperation) => "asset_settle_cancel",
    AssetClaimFees(AssetClaimFeesOperation) => "asset_claim_fees",
    FbaDistribute(FbaDistributeOperation) => "fba_distribute",
    AccountRestrict(AccountRestrictOperation) => "account_restrict",
    AccountAllowRegistrar(AccountAllowRegistrarOperation) => "account_allow_registrar",
    AllowCreateAsset(AllowCreateAssetOperation) => "allow_create_asset",
    SetOnlineTime(SetOnlineTimeOperation) => "set_online_time",
    SetVerificationIsRequired(SetVerificationIsRequiredOperation) => "set_verification_is_required",
    AllowCreateAddresses(AllowCreateAddressesOperation) => "allow_create_addresses",
    AddAddress(AddAddressOperation) => "add_address",
    SetBurningMode(SetBurningModeOperation) => "set_burning_mode",
    AssetsUpdateFeePayer(AssetsUpdateFeePayerOperation) => "assets_update_fee_payer",
    AssetUpdateExchangeRate(AssetUpdateExchangeRateOperation) => "asset_update_exchange_rate",
    AccountUpdateAuthorities(AccountUpdateAuthoritiesOperation) => "account_update_authorities",
    Bonus(BonusOperation) => "bonus",
    ReferralIssue(ReferralIssueOperation) => "referral_issue",
    DailyIssue(DailyIssueOperation) => "daily_issue",
    EdcAssetFundFeePool(EdcAssetFundFeePoolOperation) => "edc_asset_fund_fee_pool",
    AssetUpdate2(AssetUpdate2Operation) => "asset_update2",
    FundCreate(FundCreateOperation) => "fund_create",
    FundUpdate(FundUpdateOperation) => "fund_update",
    FundRefill(FundRefillOperation) => "fund_refill",
    FundDeposit(FundDepositOperation) => "fund_deposit",
    FundWithdrawal(FundWithdrawalOperation) => "fund_withdrawal",
    FundPayment(FundPaymentOperation) => "fund_payment",
    FundSetEnable(FundSetEnableOperation) => "fund_set_enable",
    FundDepositSetEnable(FundDepositSetEnableOperation) => "fund_deposit_set_enable",
    FundRemove(FundRemoveOperation) => "fund_remove",
    FundChangePaymentScheme(FundChangePaymentSchemeOperation) => "fund_change_payment_scheme",
    EnableAutorenewalDeposits(EnableAutorenewalDepositsOperation) => "enable_autorenewal_deposits",
    DepositRenewal(DepositRenewalOperation) => "deposit_renewal",
    FundDepositUpdate(FundDepositUpdateOperation) => "fund_deposit_update",
    FundDepositUpdate2(FundDepositUpdate2Operation) => "fund_deposit_update2",
    FundDepositReduce(FundDepositReduceOperation) => "fund_deposit_reduce",
    ChequeCreate(ChequeCreateOperation) => "cheque_create",
    ChequeUse(ChequeUseOperation) => "cheque_use",
    ChequeReverse(ChequeReverseOperation) => "cheque_reverse",
    BlindTransfer2(BlindTransfer2Operation) => "blind_transfer2",
    UpdateBlindTransfer2Settings(UpdateBlindTransfer2SettingsOperation) => "update_blind_transfer2_settings",
    UpdateSettings(UpdateSettingsOperation) => "update_settings",
    SetMarket(SetMarketOperation) => "set_market",
    CreateMarketAddress(CreateMarketAddressOperation) => "create_market_address",
    AccountEdcLimitDailyVolume(AccountEdcLimitDailyVolumeOperation) => "account_edc_limit_daily_volume",
    Denominate(DenominateOperation) => "denominate",
    SetWitnessException(SetWitnessExceptionOperation) => "set_witness_exception",
    UpdateReferralSettings(UpdateReferralSettingsOperation) => "update_referral_settings",
    UpdateAccountsReferrer(UpdateAccountsReferrerOperation) => "update_accounts_referrer",
    EnableAccountReferralPayments(EnableAccountReferralPaymentsOperation) => "enable_account_referral_payments",
}

impl Operation {
    /// Declared fee
    pub fn fee(&self) -> Asset {
        self.as_base().fee()
    }

    /// Account paying the fee
    pub fn fee_payer(&self) -> AccountId {
        self.as_base().fee_payer()
    }

    /// Stateless validation: non-negative fee plus per-kind field checks
    pub fn validate(&self) -> Result<(), ValidationError> {
        check(self.fee().amount >= 0, "fee must be non-negative")?;
        self.as_base().validate()
    }

    /// Authorities required to authorize this operation
    pub fn required_authorities(&self) -> RequiredAuthorities {
        let mut required = RequiredAuthorities::default();
        self.add_required_authorities(&mut required);
        required
    }

    /// Add this operation's required authorities to an existing set
    pub fn add_required_authorities(&self, required: &mut RequiredAuthorities) {
        self.as_base().required_authorities(required);
    }

    /// Principal amount the operation debits from the fee payer
    ///
    /// Used together with the declared fee to check that the fee payer stays
    /// solvent. Operations that move no funds out of the fee payer return
    /// `None`.
    pub fn principal_debit(&self) -> Option<(AccountId, Asset)> {
        match self {
            Operation::Transfer(op) => Some((op.from, op.amount)),
            Operation::BlindTransfer2(op) => Some((op.from, op.amount)),
            Operation::OverrideTransfer(op) => Some((op.from, op.amount)),
            Operation::ChequeCreate(op) => {
                let total = op.payee_amount.amount.checked_mul(i64::from(op.payee_count))?;
                Some((op.account_id, Asset::new(total, op.payee_amount.asset_id)))
            }
            Operation::FundRefill(op) => Some((op.from_account, op.amount)),
            _ => None,
        }
    }
}
