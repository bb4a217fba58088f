//! Market and order operations

use super::{base_operation, check, BaseOperation};
use crate::error::ValidationError;
use crate::types::{AccountId, Asset, LimitOrderId, Timestamp};
use serde::{Deserialize, Serialize};

/// Place a limit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Seller, pays the fee
    pub seller: AccountId,
    /// Amount offered
    pub amount_to_sell: Asset,
    /// Minimum amount accepted
    pub min_to_receive: Asset,
    /// Order expiration
    pub expiration: Timestamp,
    /// Cancel unless filled immediately
    pub fill_or_kill: bool,
}

impl BaseOperation for LimitOrderCreateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.seller
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(
            self.amount_to_sell.asset_id != self.min_to_receive.asset_id,
            "cannot trade an asset for itself",
        )?;
        check(
            self.amount_to_sell.amount > 0 && self.min_to_receive.amount > 0,
            "order amounts must be positive",
        )
    }
}

/// Cancel a limit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderCancelOperation {
    /// Declared fee
    pub fee: Asset,
    /// Order owner
    pub fee_paying_account: AccountId,
    /// Order cancelled
    pub order: LimitOrderId,
}

base_operation!(LimitOrderCancelOperation, fee_paying_account);

/// Adjust collateral or debt of a call order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOrderUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Position owner
    pub funding_account: AccountId,
    /// Collateral change
    pub delta_collateral: Asset,
    /// Debt change
    pub delta_debt: Asset,
}

base_operation!(CallOrderUpdateOperation, funding_account);

/// Order fill notification (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOrderOperation {
    /// Declared fee
    pub fee: Asset,
    /// Order filled, `space.type.instance`
    pub order_id: String,
    /// Order owner
    pub account_id: AccountId,
    /// Amount paid
    pub pays: Asset,
    /// Amount received
    pub receives: Asset,
}

base_operation!(FillOrderOperation, account_id);

/// Mark an account as a market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMarketOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Account marked
    pub to_account: AccountId,
    /// Market flag
    pub enabled: bool,
}

base_operation!(SetMarketOperation, issuer);

/// Create a payment address for a market account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMarketAddressOperation {
    /// Declared fee
    pub fee: Asset,
    /// Market account
    pub market_account_id: AccountId,
    /// Address notes
    pub notes: String,
}

base_operation!(CreateMarketAddressOperation, market_account_id);
