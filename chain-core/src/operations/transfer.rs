//! Transfer family and blind balance operations

use super::{base_operation, check, BaseOperation, RequiredAuthorities};
use crate::error::ValidationError;
use crate::types::{AccountId, Asset, Authority, TEMP_ACCOUNT};
use serde::{Deserialize, Serialize};

/// Move `amount` from `from` to `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOperation {
    /// Declared fee
    pub fee: Asset,
    /// Sender, pays the fee
    pub from: AccountId,
    /// Receiver
    pub to: AccountId,
    /// Amount transferred
    pub amount: Asset,
    /// Optional memo
    pub memo: Option<String>,
}

impl BaseOperation for TransferOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.from
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.from != self.to, "cannot transfer to self")?;
        check(self.amount.amount > 0, "transfer amount must be positive")
    }
}

/// Transfer recorded as a blind transfer object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindTransfer2Operation {
    /// Declared fee
    pub fee: Asset,
    /// Sender, pays the fee
    pub from: AccountId,
    /// Receiver
    pub to: AccountId,
    /// Amount transferred
    pub amount: Asset,
    /// Optional memo
    pub memo: Option<String>,
}

impl BaseOperation for BlindTransfer2Operation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.from
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.from != self.to, "cannot transfer to self")?;
        check(self.amount.amount > 0, "transfer amount must be positive")
    }
}

/// Issuer-forced transfer between two holders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTransferOperation {
    /// Declared fee
    pub fee: Asset,
    /// Asset issuer, pays the fee
    pub issuer: AccountId,
    /// Account debited
    pub from: AccountId,
    /// Account credited
    pub to: AccountId,
    /// Amount moved
    pub amount: Asset,
    /// Optional memo
    pub memo: Option<String>,
}

impl BaseOperation for OverrideTransferOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.from != self.to, "cannot transfer to self")?;
        check(self.from != self.issuer, "issuer cannot override its own balance")?;
        check(self.amount.amount > 0, "transfer amount must be positive")
    }
}

/// Set the default blind transfer fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBlindTransfer2SettingsOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// New default fee
    pub blind_fee: Asset,
}

impl BaseOperation for UpdateBlindTransfer2SettingsOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.blind_fee.amount >= 0, "blind fee must be non-negative")
    }
}

/// Blinded output commitment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindOutput {
    /// Pedersen commitment, hex
    pub commitment: String,
    /// Authority able to spend the output
    pub owner: Authority,
}

/// Blinded input being spent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindInput {
    /// Pedersen commitment, hex
    pub commitment: String,
    /// Authority that must sign to spend the input
    pub owner: Authority,
}

/// Move a public balance into blinded outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferToBlindOperation {
    /// Declared fee
    pub fee: Asset,
    /// Public account funding the outputs
    pub from: AccountId,
    /// Amount blinded
    pub amount: Asset,
    /// Blinded outputs
    pub outputs: Vec<BlindOutput>,
}

impl BaseOperation for TransferToBlindOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.from
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.amount.amount > 0, "amount must be positive")?;
        check(!self.outputs.is_empty(), "at least one output is required")
    }
}

/// Move value between blinded commitments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindTransferOperation {
    /// Declared fee
    pub fee: Asset,
    /// Inputs spent
    pub inputs: Vec<BlindInput>,
    /// Outputs created
    pub outputs: Vec<BlindOutput>,
}

impl BaseOperation for BlindTransferOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        TEMP_ACCOUNT
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(!self.inputs.is_empty(), "at least one input is required")?;
        check(!self.outputs.is_empty(), "at least one output is required")
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required
            .other
            .extend(self.inputs.iter().map(|input| input.owner.clone()));
    }
}

/// Move blinded inputs back into a public balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFromBlindOperation {
    /// Declared fee
    pub fee: Asset,
    /// Public account credited
    pub to: AccountId,
    /// Amount unblinded
    pub amount: Asset,
    /// Inputs spent
    pub inputs: Vec<BlindInput>,
}

impl BaseOperation for TransferFromBlindOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        TEMP_ACCOUNT
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.amount.amount > 0, "amount must be positive")?;
        check(!self.inputs.is_empty(), "at least one input is required")
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required
            .other
            .extend(self.inputs.iter().map(|input| input.owner.clone()));
    }
}

/// Distribute an accumulated fee-backed-asset pool (virtual)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FbaDistributeOperation {
    /// Declared fee
    pub fee: Asset,
    /// Receiving account
    pub account_id: AccountId,
    /// Pool object, `space.type.instance`
    pub fba_id: String,
    /// Amount distributed
    pub amount: Asset,
}

base_operation!(FbaDistributeOperation, account_id);
