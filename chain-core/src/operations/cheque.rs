//! Cheque operations

use super::{check, BaseOperation};
use crate::cheque::{validate_cheque_code, MAX_CHEQUE_PAYEES};
use crate::error::ValidationError;
use crate::types::{AccountId, Asset, ChequeId, Timestamp};
use serde::{Deserialize, Serialize};

/// Lock funds into a new cheque
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Drawer, pays the fee
    pub account_id: AccountId,
    /// Redemption code
    pub code: String,
    /// Amount paid to each payee
    pub payee_amount: Asset,
    /// Number of payee slots
    pub payee_count: u32,
    /// Expiration time
    pub expiration_datetime: Timestamp,
}

impl BaseOperation for ChequeCreateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.account_id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_cheque_code(&self.code)?;
        check(self.payee_amount.amount > 0, "payee amount must be positive")?;
        check(self.payee_count > 0, "payee count must be positive")?;
        check(
            self.payee_count <= MAX_CHEQUE_PAYEES,
            "payee count exceeds the per-cheque limit",
        )
    }
}

/// Redeem one slot of a cheque
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeUseOperation {
    /// Declared fee
    pub fee: Asset,
    /// Payee, pays the fee
    pub account_id: AccountId,
    /// Redemption code
    pub code: String,
    /// Expected payee amount
    pub amount: Asset,
}

impl BaseOperation for ChequeUseOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.account_id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_cheque_code(&self.code)?;
        check(self.amount.amount > 0, "amount must be positive")
    }
}

/// Return the unredeemed remainder of a cheque to its drawer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeReverseOperation {
    /// Declared fee
    pub fee: Asset,
    /// Drawer, pays the fee
    pub account_id: AccountId,
    /// Cheque reversed
    pub cheque_id: ChequeId,
    /// Amount returned
    pub amount: Asset,
}

impl BaseOperation for ChequeReverseOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.account_id
    }
}
