//! Asset operations

use super::{base_operation, check, BaseOperation};
use crate::error::ValidationError;
use crate::objects::AssetOptions;
use crate::types::{AccountId, Asset, AssetId, ForceSettlementId, Price, ShareType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum asset precision
pub const MAX_ASSET_PRECISION: u8 = 12;

/// Create a new asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer, pays the fee
    pub issuer: AccountId,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places
    pub precision: u8,
    /// Initial options
    pub common_options: AssetOptions,
    /// Market-issued asset
    pub market_issued: bool,
}

impl BaseOperation for AssetCreateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(
            !self.symbol.is_empty()
                && self
                    .symbol
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.'),
            "asset symbol must be non-empty uppercase",
        )?;
        check(
            self.precision <= MAX_ASSET_PRECISION,
            "asset precision is too large",
        )
    }
}

/// Grant an account the right to create assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowCreateAssetOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Account granted
    pub to_account: AccountId,
    /// Grant or revoke
    pub value: bool,
}

base_operation!(AllowCreateAssetOperation, issuer);

/// Replace asset options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Current issuer
    pub issuer: AccountId,
    /// Asset updated
    pub asset_to_update: AssetId,
    /// New issuer
    pub new_issuer: Option<AccountId>,
    /// New options
    pub new_options: AssetOptions,
}

base_operation!(AssetUpdateOperation, issuer);

/// Change asset issuer (committee variant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdate2Operation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Asset updated
    pub asset_to_update: AssetId,
    /// New issuer
    pub new_issuer: Option<AccountId>,
}

base_operation!(AssetUpdate2Operation, issuer);

/// Update bitasset options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdateBitassetOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Asset updated
    pub asset_to_update: AssetId,
}

base_operation!(AssetUpdateBitassetOperation, issuer);

/// Replace the price feed producers of a market-issued asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdateFeedProducersOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Asset updated
    pub asset_to_update: AssetId,
    /// New producers
    pub new_feed_producers: BTreeSet<AccountId>,
}

base_operation!(AssetUpdateFeedProducersOperation, issuer);

/// Issue new supply to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIssueOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer, pays the fee
    pub issuer: AccountId,
    /// Amount issued
    pub asset_to_issue: Asset,
    /// Receiving account
    pub issue_to_account: AccountId,
    /// Optional memo
    pub memo: Option<String>,
}

impl BaseOperation for AssetIssueOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.asset_to_issue.amount > 0, "issued amount must be positive")
    }
}

/// Issue a bonus payout (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Receiving account
    pub account_id: AccountId,
    /// Amount paid
    pub amount: Asset,
}

base_operation!(BonusOperation, issuer);

/// Issue a referral payout (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralIssueOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Amount issued
    pub asset_to_issue: Asset,
    /// Receiving account
    pub issue_to_account: AccountId,
}

base_operation!(ReferralIssueOperation, issuer);

/// Issue a daily payout (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyIssueOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Amount issued
    pub asset_to_issue: Asset,
    /// Receiving account
    pub issue_to_account: AccountId,
}

base_operation!(DailyIssueOperation, issuer);

/// Return supply to the issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReserveOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account burning its balance
    pub payer: AccountId,
    /// Amount reserved
    pub amount_to_reserve: Asset,
}

impl BaseOperation for AssetReserveOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.payer
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.amount_to_reserve.amount > 0, "reserved amount must be positive")
    }
}

/// Add core asset to an asset's fee pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFundFeePoolOperation {
    /// Declared fee
    pub fee: Asset,
    /// Funding account
    pub from_account: AccountId,
    /// Asset whose pool is funded
    pub asset_id: AssetId,
    /// Core asset amount
    pub amount: ShareType,
}

base_operation!(AssetFundFeePoolOperation, from_account);

/// Add reserve asset to an asset's fee pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdcAssetFundFeePoolOperation {
    /// Declared fee
    pub fee: Asset,
    /// Funding account
    pub from_account: AccountId,
    /// Asset whose pool is funded
    pub asset_id: AssetId,
    /// Amount
    pub amount: ShareType,
}

base_operation!(EdcAssetFundFeePoolOperation, from_account);

/// Request settlement of a market-issued asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSettleOperation {
    /// Declared fee
    pub fee: Asset,
    /// Settling account
    pub account: AccountId,
    /// Amount settled
    pub amount: Asset,
}

base_operation!(AssetSettleOperation, account);

/// Globally settle a market-issued asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetGlobalSettleOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Asset settled
    pub asset_to_settle: AssetId,
    /// Settlement price
    pub settle_price: Price,
}

base_operation!(AssetGlobalSettleOperation, issuer);

/// Publish a price feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPublishFeedOperation {
    /// Declared fee
    pub fee: Asset,
    /// Feed producer
    pub publisher: AccountId,
    /// Asset priced
    pub asset_id: AssetId,
}

base_operation!(AssetPublishFeedOperation, publisher);

/// Cancel a pending settlement (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSettleCancelOperation {
    /// Declared fee
    pub fee: Asset,
    /// Settlement cancelled
    pub settlement: ForceSettlementId,
    /// Settling account
    pub account: AccountId,
    /// Amount returned
    pub amount: Asset,
}

base_operation!(AssetSettleCancelOperation, account);

/// Withdraw accumulated fees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetClaimFeesOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Amount claimed
    pub amount_to_claim: Asset,
}

base_operation!(AssetClaimFeesOperation, issuer);

/// Change the asset used to pay fees for a set of assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsUpdateFeePayerOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Assets updated
    pub assets_to_update: BTreeSet<AssetId>,
    /// Asset fees are paid in
    pub fee_payer_asset: AssetId,
}

base_operation!(AssetsUpdateFeePayerOperation, issuer);

/// Update an asset's core exchange rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdateExchangeRateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Issuer
    pub issuer: AccountId,
    /// Asset updated
    pub asset_to_update: AssetId,
    /// New rate
    pub core_exchange_rate: Price,
}

base_operation!(AssetUpdateExchangeRateOperation, issuer);

/// Redenominate an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Asset redenominated
    pub asset_id: AssetId,
}

base_operation!(DenominateOperation, issuer);
