//! Ledger objects held by the store
//!
//! Objects are mutated only through [`crate::store::LedgerStore`] modify
//! callbacks invoked from evaluator `apply`.

use crate::operations::FundOptions;
use crate::types::{
    AccountId, Asset, AssetId, Authority, BlindTransferId, FundDepositId, FundId, Price,
    ShareType, Timestamp,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Asset flag bits
pub mod asset_flags {
    /// Holders must be whitelisted by one of the asset's whitelist authorities
    pub const WHITE_LIST: u16 = 0x02;
    /// Issuer may move balances with `override_transfer`
    pub const OVERRIDE_AUTHORITY: u16 = 0x04;
    /// Transfers must involve the issuer
    pub const TRANSFER_RESTRICTED: u16 = 0x08;
}

/// Account object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountObject {
    /// Account id
    pub id: AccountId,
    /// Unique account name
    pub name: String,
    /// Registrar account
    pub registrar: AccountId,
    /// Referrer account
    pub referrer: AccountId,
    /// Owner authority
    pub owner: Authority,
    /// Active authority
    pub active: Authority,
    /// Incoming transfers burn supply instead of crediting the account
    pub burning_mode_enabled: bool,
    /// Reserve-asset daily volume limit is enforced for this account
    pub edc_limit_daily_volume_enabled: bool,
    /// Reserve-asset volume sent since the last external reset
    pub edc_transfers_daily_amount_counter: ShareType,
    /// Accounts that have whitelisted this account
    pub whitelisting_accounts: BTreeSet<AccountId>,
    /// Accounts that have blacklisted this account
    pub blacklisting_accounts: BTreeSet<AccountId>,
}

/// Asset options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOptions {
    /// Flag bits, see [`asset_flags`]
    pub flags: u16,
    /// Accounts whose whitelist is honoured
    pub whitelist_authorities: BTreeSet<AccountId>,
    /// Accounts whose blacklist is honoured
    pub blacklist_authorities: BTreeSet<AccountId>,
    /// Exchange rate used to convert core-asset fees
    pub core_exchange_rate: Price,
}

impl AssetOptions {
    /// Options with no flags and a 1:1 core exchange rate
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            flags: 0,
            whitelist_authorities: BTreeSet::new(),
            blacklist_authorities: BTreeSet::new(),
            core_exchange_rate: Price::unit(asset_id),
        }
    }
}

/// Asset object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetObject {
    /// Asset id
    pub id: AssetId,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places
    pub precision: u8,
    /// Issuer account
    pub issuer: AccountId,
    /// Options
    pub options: AssetOptions,
    /// Supply is backed by collateral (market-issued asset)
    pub market_issued: bool,
}

impl AssetObject {
    /// Transfers must involve the issuer
    pub fn is_transfer_restricted(&self) -> bool {
        self.options.flags & asset_flags::TRANSFER_RESTRICTED != 0
    }

    /// Issuer may override transfers
    pub fn can_override(&self) -> bool {
        self.options.flags & asset_flags::OVERRIDE_AUTHORITY != 0
    }

    /// Holders must be whitelisted
    pub fn enforces_white_list(&self) -> bool {
        self.options.flags & asset_flags::WHITE_LIST != 0
    }

    /// Market-issued (collateral backed)
    pub fn is_market_issued(&self) -> bool {
        self.market_issued
    }

    /// Amount of this asset
    pub fn amount(&self, amount: ShareType) -> Asset {
        Asset::new(amount, self.id)
    }
}

/// Mutable per-asset supply data
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetDynamicData {
    /// Owning asset
    pub asset_id: AssetId,
    /// Circulating supply, never negative
    pub current_supply: ShareType,
    /// Fees collected in this asset
    pub accumulated_fees: ShareType,
}

/// Per-asset fee percentage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFee {
    /// Asset the percentage applies to
    pub asset_id: AssetId,
    /// Percent of the transferred amount
    pub percent: Decimal,
}

/// Global settings singleton (`settings_id 0`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsObject {
    /// Fee percentages for plain transfers
    pub transfer_fees: Vec<SettingsFee>,
    /// Fee percentages for blind transfers
    pub blind_transfer_fees: Vec<SettingsFee>,
    /// Flat blind transfer fee used when no percentage applies
    pub blind_transfer_default_fee: Asset,
    /// Daily reserve-asset volume limit
    pub edc_transfers_daily_limit: ShareType,
}

impl SettingsObject {
    /// Transfer fee percent configured for `asset`
    pub fn transfer_fee_percent(&self, asset: AssetId) -> Option<Decimal> {
        find_percent(&self.transfer_fees, asset)
    }

    /// Blind transfer fee percent configured for `asset`
    pub fn blind_transfer_fee_percent(&self, asset: AssetId) -> Option<Decimal> {
        find_percent(&self.blind_transfer_fees, asset)
    }
}

fn find_percent(table: &[SettingsFee], asset: AssetId) -> Option<Decimal> {
    table
        .iter()
        .find(|entry| entry.asset_id == asset)
        .map(|entry| entry.percent)
}

/// Direction of a committee restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directionality {
    /// Account may not send
    Payer,
    /// Account may not receive
    Receiver,
    /// Account may neither send nor receive
    Full,
}

/// Committee restriction on an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRestriction {
    /// Restricted account
    pub account: AccountId,
    /// Restriction direction
    pub restriction_type: Directionality,
}

impl AccountRestriction {
    /// Whether the restriction blocks the given direction
    pub fn blocks(&self, direction: Directionality) -> bool {
        self.restriction_type == Directionality::Full || self.restriction_type == direction
    }
}

/// Record of an applied blind transfer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlindTransferObject {
    /// Record id
    pub id: BlindTransferId,
    /// Sender
    pub from: AccountId,
    /// Receiver
    pub to: AccountId,
    /// Transferred amount
    pub amount: Asset,
    /// Custom fee charged
    pub fee: ShareType,
    /// Optional memo
    pub memo: Option<String>,
    /// Time of transfer
    pub datetime: Timestamp,
}

/// Investment fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundObject {
    /// Fund id
    pub id: FundId,
    /// Unique name
    pub name: String,
    /// Owning account
    pub owner: AccountId,
    /// Fund asset
    pub asset_id: AssetId,
    /// Balance held by the fund
    pub balance: ShareType,
    /// Fund accepts deposits and refills
    pub enabled: bool,
    /// Rates and limits
    pub options: FundOptions,
}

/// Deposit into a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDepositObject {
    /// Deposit id
    pub id: FundDepositId,
    /// Fund
    pub fund_id: FundId,
    /// Depositor
    pub account_id: AccountId,
    /// Deposited amount
    pub amount: Asset,
    /// Deposit period in days
    pub period: u32,
    /// Deposit is active
    pub enabled: bool,
}
