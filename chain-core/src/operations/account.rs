//! Account operations

use super::{base_operation, check, BaseOperation, RequiredAuthorities};
use crate::error::ValidationError;
use crate::types::{AccountId, Asset, Authority};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Register a new account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Registrar, pays the fee
    pub registrar: AccountId,
    /// Referrer
    pub referrer: AccountId,
    /// Account name
    pub name: String,
    /// Owner authority
    pub owner: Authority,
    /// Active authority
    pub active: Authority,
}

impl BaseOperation for AccountCreateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.registrar
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(!self.name.is_empty(), "account name must not be empty")?;
        check(!self.owner.is_impossible(), "owner authority is impossible")?;
        check(!self.active.is_impossible(), "active authority is impossible")
    }
}

/// Replace an account's authorities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account updated, pays the fee
    pub account: AccountId,
    /// New owner authority
    pub owner: Option<Authority>,
    /// New active authority
    pub active: Option<Authority>,
}

impl BaseOperation for AccountUpdateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(owner) = &self.owner {
            check(!owner.is_impossible(), "owner authority is impossible")?;
        }
        if let Some(active) = &self.active {
            check(!active.is_impossible(), "active authority is impossible")?;
        }
        Ok(())
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        if self.owner.is_some() {
            required.owner.insert(self.account);
        } else {
            required.active.insert(self.account);
        }
    }
}

/// Replace an account's authorities (committee variant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateAuthoritiesOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account, pays the fee
    pub issuer: AccountId,
    /// Account updated
    pub account: AccountId,
    /// New owner authority
    pub owner: Option<Authority>,
    /// New active authority
    pub active: Option<Authority>,
}

base_operation!(AccountUpdateAuthoritiesOperation, issuer);

/// Add or remove an account from a white/black list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWhitelistOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account maintaining the list
    pub authorizing_account: AccountId,
    /// Account listed
    pub account_to_list: AccountId,
    /// Listing bits (1 white, 2 black)
    pub new_listing: u8,
}

base_operation!(AccountWhitelistOperation, authorizing_account);

/// Upgrade to lifetime membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpgradeOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account upgraded
    pub account_to_upgrade: AccountId,
    /// Lifetime upgrade
    pub upgrade_to_lifetime_member: bool,
}

base_operation!(AccountUpgradeOperation, account_to_upgrade);

/// Transfer account ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTransferOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account transferred
    pub account_id: AccountId,
    /// New owner
    pub new_owner: AccountId,
}

base_operation!(AccountTransferOperation, account_id);

/// Committee restriction on an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRestrictOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Restricted account
    pub target: AccountId,
    /// 0 clears, 1 payer, 2 receiver, 3 full
    pub action: u8,
}

base_operation!(AccountRestrictOperation, issuer);

/// Allow an account to register others
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAllowRegistrarOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Account affected
    pub target: AccountId,
    /// Allow or disallow
    pub action: u8,
}

base_operation!(AccountAllowRegistrarOperation, issuer);

/// Report online time for accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOnlineTimeOperation {
    /// Declared fee
    pub fee: Asset,
    /// Reporting account
    pub issuer: AccountId,
    /// Minutes online per account
    pub online_info: BTreeMap<AccountId, u16>,
}

base_operation!(SetOnlineTimeOperation, issuer);

/// Require verification for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetVerificationIsRequiredOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Account affected
    pub target: AccountId,
    /// Verification required
    pub verification_is_required: bool,
}

base_operation!(SetVerificationIsRequiredOperation, issuer);

/// Toggle address creation network-wide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowCreateAddressesOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Addresses may be created
    pub allow: bool,
}

base_operation!(AllowCreateAddressesOperation, issuer);

/// Create a deposit address for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAddressOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account receiving the address
    pub to_account: AccountId,
}

base_operation!(AddAddressOperation, to_account);

/// Enable or disable burn mode for incoming transfers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBurningModeOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account changing its own mode
    pub account_id: AccountId,
    /// New mode
    pub enabled: bool,
}

base_operation!(SetBurningModeOperation, account_id);

/// Toggle reserve-asset daily volume enforcement for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEdcLimitDailyVolumeOperation {
    /// Declared fee
    pub fee: Asset,
    /// Reserve asset issuer
    pub issuer: AccountId,
    /// Account affected
    pub account_id: AccountId,
    /// Enforce the limit
    pub enabled: bool,
}

base_operation!(AccountEdcLimitDailyVolumeOperation, issuer);

/// Update referral program settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReferralSettingsOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
}

base_operation!(UpdateReferralSettingsOperation, issuer);

/// Move accounts under a new referrer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccountsReferrerOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Accounts moved
    pub accounts: Vec<AccountId>,
    /// New referrer
    pub new_referrer: AccountId,
}

base_operation!(UpdateAccountsReferrerOperation, issuer);

/// Opt in or out of referral payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnableAccountReferralPaymentsOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account affected
    pub account_id: AccountId,
    /// Receive referral payments
    pub enabled: bool,
}

base_operation!(EnableAccountReferralPaymentsOperation, account_id);
