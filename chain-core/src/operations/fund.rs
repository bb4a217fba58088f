//! Fund and deposit operations

use super::{base_operation, check, BaseOperation};
use crate::error::ValidationError;
use crate::types::{AccountId, Asset, AssetId, FundDepositId, FundId, ShareType, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Daily rate paid to depositors above a deposit threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRate {
    /// Minimum fund balance for the rate
    pub amount: ShareType,
    /// Daily percent, in hundredths of a percent
    pub day_percent: u32,
}

/// Payout rate for a deposit period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRate {
    /// Deposit period in days
    pub period: u32,
    /// Percent paid, in hundredths of a percent
    pub percent: u32,
}

/// Fund rates and limits
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FundOptions {
    /// Free-form description
    pub description: String,
    /// Fund period in days
    pub period: u32,
    /// Minimum deposit amount
    pub min_deposit: ShareType,
    /// Monthly reduction of rates
    pub rates_reduction_per_month: i32,
    /// Fund balance thresholds and rates
    pub fund_rates: Vec<FundRate>,
    /// Payout rates per deposit period
    pub payment_rates: Vec<PaymentRate>,
}

impl FundOptions {
    /// Check rates and limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        check(
            self.rates_reduction_per_month > -1,
            "rates_reduction_per_month must be greater than -1",
        )?;
        check(self.period > 0, "period must be greater than 0")?;
        check(!self.fund_rates.is_empty(), "fund_rates can't be empty")?;
        check(!self.payment_rates.is_empty(), "payment_rates can't be empty")?;
        check(self.min_deposit > 0, "min_deposit must be greater than 0")?;
        check(
            self.payment_rates.iter().all(|rate| rate.period > 0),
            "each payment rate period must be greater than 0",
        )?;
        check(
            self.fund_rates.iter().all(|rate| rate.amount > 0),
            "each fund rate amount must be greater than 0",
        )?;

        let distinct: BTreeSet<ShareType> = self.fund_rates.iter().map(|rate| rate.amount).collect();
        check(
            distinct.len() == self.fund_rates.len(),
            "all fund rate amounts must be different",
        )
    }
}

/// Create a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner, pays the fee
    pub owner: AccountId,
    /// Unique fund name
    pub name: String,
    /// Fund asset
    pub asset_id: AssetId,
    /// Rates and limits
    pub options: FundOptions,
}

impl BaseOperation for FundCreateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.owner
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(!self.name.is_empty(), "fund name must not be empty")?;
        self.options.validate()
    }
}

/// Replace fund options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner
    pub from_account: AccountId,
    /// Fund updated
    pub id: FundId,
    /// New options
    pub options: FundOptions,
}

impl BaseOperation for FundUpdateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.from_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.options.validate()
    }
}

/// Add to a fund's balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRefillOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account paying in
    pub from_account: AccountId,
    /// Fund refilled
    pub id: FundId,
    /// Amount paid in, in the fund asset
    pub amount: Asset,
}

impl BaseOperation for FundRefillOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.from_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.amount.amount > 0, "amount must be > 0")
    }
}

/// Open a deposit in a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDepositOperation {
    /// Declared fee
    pub fee: Asset,
    /// Depositor
    pub from_account: AccountId,
    /// Fund
    pub fund_id: FundId,
    /// Amount deposited
    pub amount: Asset,
    /// Deposit period in days
    pub period: u32,
}

impl BaseOperation for FundDepositOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.from_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.amount.amount > 0, "amount must be > 0")?;
        check(self.period > 0, "period must be > 0")
    }
}

/// Owner withdrawal from a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundWithdrawalOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner
    pub issuer: AccountId,
    /// Fund
    pub fund_id: FundId,
    /// Amount withdrawn
    pub asset_to_issue: Asset,
    /// Receiving account
    pub issue_to_account: AccountId,
}

base_operation!(FundWithdrawalOperation, issuer);

/// Fund payout to a depositor (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundPaymentOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner
    pub issuer: AccountId,
    /// Fund
    pub fund_id: FundId,
    /// Amount paid
    pub asset_to_issue: Asset,
    /// Receiving account
    pub issue_to_account: AccountId,
}

base_operation!(FundPaymentOperation, issuer);

/// Enable or disable a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSetEnableOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner
    pub from_account: AccountId,
    /// Fund
    pub id: FundId,
    /// Enabled flag
    pub enabled: bool,
}

base_operation!(FundSetEnableOperation, from_account);

/// Enable or disable a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDepositSetEnableOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner
    pub from_account: AccountId,
    /// Deposit
    pub deposit_id: FundDepositId,
    /// Enabled flag
    pub enabled: bool,
}

base_operation!(FundDepositSetEnableOperation, from_account);

/// Remove a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRemoveOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner
    pub from_account: AccountId,
    /// Fund
    pub id: FundId,
}

base_operation!(FundRemoveOperation, from_account);

/// Change how a fund pays out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundChangePaymentSchemeOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund owner
    pub from_account: AccountId,
    /// Fund
    pub id: FundId,
    /// Scheme number
    pub payment_scheme: u8,
}

base_operation!(FundChangePaymentSchemeOperation, from_account);

/// Toggle automatic renewal of an account's deposits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnableAutorenewalDepositsOperation {
    /// Declared fee
    pub fee: Asset,
    /// Depositor
    pub account_id: AccountId,
    /// Renewal enabled
    pub enabled: bool,
}

base_operation!(EnableAutorenewalDepositsOperation, account_id);

/// Renew a deposit (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRenewalOperation {
    /// Declared fee
    pub fee: Asset,
    /// Depositor
    pub account_id: AccountId,
    /// Deposit renewed
    pub deposit_id: FundDepositId,
    /// New rate
    pub percent: u32,
    /// New end of the deposit
    pub datetime_end: Timestamp,
}

base_operation!(DepositRenewalOperation, account_id);

/// Change the rate of a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDepositUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund administration account
    pub issuer: AccountId,
    /// Deposit
    pub deposit_id: FundDepositId,
    /// New rate
    pub percent: u32,
}

base_operation!(FundDepositUpdateOperation, issuer);

/// Change the rate and daily payout of a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDepositUpdate2Operation {
    /// Declared fee
    pub fee: Asset,
    /// Fund administration account
    pub issuer: AccountId,
    /// Deposit
    pub deposit_id: FundDepositId,
    /// New rate
    pub percent: u32,
    /// New daily payout
    pub daily_payment: Asset,
}

base_operation!(FundDepositUpdate2Operation, issuer);

/// Reduce the amount of a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDepositReduceOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fund administration account
    pub issuer: AccountId,
    /// Deposit
    pub deposit_id: FundDepositId,
    /// Amount removed
    pub amount: ShareType,
}

base_operation!(FundDepositReduceOperation, issuer);
