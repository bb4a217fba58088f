//! Governance, proposal and miscellaneous operations

use super::{base_operation, check, BaseOperation, Operation, RequiredAuthorities};
use crate::error::ValidationError;
use crate::objects::SettingsFee;
use crate::types::{
    AccountId, Asset, AssetId, BalanceId, BlockId, CommitteeMemberId, ProposalId, PublicKey,
    ShareType, Timestamp, VestingBalanceId, WithdrawPermissionId, WitnessId, COMMITTEE_ACCOUNT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Register a witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Witness account
    pub witness_account: AccountId,
    /// Witness URL
    pub url: String,
}

base_operation!(WitnessCreateOperation, witness_account);

/// Update a witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Witness
    pub witness: WitnessId,
    /// Witness account
    pub witness_account: AccountId,
    /// New URL
    pub new_url: Option<String>,
}

base_operation!(WitnessUpdateOperation, witness_account);

/// Exempt a witness from a schedule rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWitnessExceptionOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// Witness account
    pub witness_account: AccountId,
}

base_operation!(SetWitnessExceptionOperation, issuer);

/// Register a committee member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMemberCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Member account
    pub committee_member_account: AccountId,
    /// Member URL
    pub url: String,
}

base_operation!(CommitteeMemberCreateOperation, committee_member_account);

/// Update a committee member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMemberUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Member
    pub committee_member: CommitteeMemberId,
    /// Member account
    pub committee_member_account: AccountId,
    /// New URL
    pub new_url: Option<String>,
}

base_operation!(CommitteeMemberUpdateOperation, committee_member_account);

/// Change global chain parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMemberUpdateGlobalParametersOperation {
    /// Declared fee
    pub fee: Asset,
    /// New maximum authority depth
    pub max_authority_depth: Option<u8>,
}

impl BaseOperation for CommitteeMemberUpdateGlobalParametersOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        COMMITTEE_ACCOUNT
    }
}

/// Operation wrapped in a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpWrapper {
    /// Proposed operation
    pub op: Operation,
}

/// Propose a set of operations for later approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Proposer, pays the fee
    pub fee_paying_account: AccountId,
    /// Proposal expiration
    pub expiration_time: Timestamp,
    /// Proposed operations
    pub proposed_ops: Vec<OpWrapper>,
    /// Review period before execution
    pub review_period_seconds: Option<u32>,
}

impl BaseOperation for ProposalCreateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.fee_paying_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(!self.proposed_ops.is_empty(), "proposal must contain operations")
    }
}

/// Add or remove proposal approvals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fee payer
    pub fee_paying_account: AccountId,
    /// Proposal updated
    pub proposal: ProposalId,
    /// Active approvals added
    pub active_approvals_to_add: BTreeSet<AccountId>,
    /// Active approvals removed
    pub active_approvals_to_remove: BTreeSet<AccountId>,
    /// Owner approvals added
    pub owner_approvals_to_add: BTreeSet<AccountId>,
    /// Owner approvals removed
    pub owner_approvals_to_remove: BTreeSet<AccountId>,
    /// Key approvals added
    pub key_approvals_to_add: BTreeSet<PublicKey>,
    /// Key approvals removed
    pub key_approvals_to_remove: BTreeSet<PublicKey>,
}

impl BaseOperation for ProposalUpdateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.fee_paying_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let changes = self.active_approvals_to_add.len()
            + self.active_approvals_to_remove.len()
            + self.owner_approvals_to_add.len()
            + self.owner_approvals_to_remove.len()
            + self.key_approvals_to_add.len()
            + self.key_approvals_to_remove.len();
        check(changes > 0, "proposal update must change approvals")?;
        check(
            self.active_approvals_to_add
                .is_disjoint(&self.active_approvals_to_remove),
            "cannot add and remove the same active approval",
        )?;
        check(
            self.owner_approvals_to_add
                .is_disjoint(&self.owner_approvals_to_remove),
            "cannot add and remove the same owner approval",
        )
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.active.insert(self.fee_paying_account);
        required.active.extend(self.active_approvals_to_add.iter().copied());
        required
            .active
            .extend(self.active_approvals_to_remove.iter().copied());
        required.owner.extend(self.owner_approvals_to_add.iter().copied());
        required
            .owner
            .extend(self.owner_approvals_to_remove.iter().copied());
    }
}

/// Delete a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDeleteOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fee payer
    pub fee_paying_account: AccountId,
    /// Delete with owner authority
    pub using_owner_authority: bool,
    /// Proposal deleted
    pub proposal: ProposalId,
}

impl BaseOperation for ProposalDeleteOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.fee_paying_account
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        if self.using_owner_authority {
            required.owner.insert(self.fee_paying_account);
        } else {
            required.active.insert(self.fee_paying_account);
        }
    }
}

/// Allow another account to withdraw periodically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawPermissionCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account granting the permission
    pub withdraw_from_account: AccountId,
    /// Account allowed to withdraw
    pub authorized_account: AccountId,
    /// Limit per period
    pub withdrawal_limit: Asset,
    /// Period length in seconds
    pub withdrawal_period_sec: u32,
}

base_operation!(WithdrawPermissionCreateOperation, withdraw_from_account);

/// Change a withdraw permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawPermissionUpdateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account granting the permission
    pub withdraw_from_account: AccountId,
    /// Account allowed to withdraw
    pub authorized_account: AccountId,
    /// Permission changed
    pub permission_to_update: WithdrawPermissionId,
    /// New limit per period
    pub withdrawal_limit: Asset,
}

base_operation!(WithdrawPermissionUpdateOperation, withdraw_from_account);

/// Withdraw under a permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawPermissionClaimOperation {
    /// Declared fee
    pub fee: Asset,
    /// Permission used
    pub withdraw_permission: WithdrawPermissionId,
    /// Account debited
    pub withdraw_from_account: AccountId,
    /// Account credited, pays the fee
    pub withdraw_to_account: AccountId,
    /// Amount withdrawn
    pub amount_to_withdraw: Asset,
}

impl BaseOperation for WithdrawPermissionClaimOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.withdraw_to_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(
            self.withdraw_from_account != self.withdraw_to_account,
            "cannot withdraw to self",
        )?;
        check(self.amount_to_withdraw.amount > 0, "amount must be positive")
    }
}

/// Revoke a withdraw permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawPermissionDeleteOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account granting the permission
    pub withdraw_from_account: AccountId,
    /// Account allowed to withdraw
    pub authorized_account: AccountId,
    /// Permission revoked
    pub withdrawal_permission: WithdrawPermissionId,
}

base_operation!(WithdrawPermissionDeleteOperation, withdraw_from_account);

/// Lock funds in a vesting balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingBalanceCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Funding account
    pub creator: AccountId,
    /// Owner of the vesting balance
    pub owner: AccountId,
    /// Amount locked
    pub amount: Asset,
}

impl BaseOperation for VestingBalanceCreateOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.creator
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.amount.amount > 0, "amount must be positive")
    }
}

/// Withdraw from a vesting balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingBalanceWithdrawOperation {
    /// Declared fee
    pub fee: Asset,
    /// Vesting balance
    pub vesting_balance: VestingBalanceId,
    /// Owner
    pub owner: AccountId,
    /// Amount withdrawn
    pub amount: Asset,
}

base_operation!(VestingBalanceWithdrawOperation, owner);

/// Create a worker proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerCreateOperation {
    /// Declared fee
    pub fee: Asset,
    /// Worker owner
    pub owner: AccountId,
    /// Start of work
    pub work_begin_date: Timestamp,
    /// End of work
    pub work_end_date: Timestamp,
    /// Daily pay
    pub daily_pay: ShareType,
    /// Worker name
    pub name: String,
}

base_operation!(WorkerCreateOperation, owner);

/// Opaque application data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fee payer
    pub payer: AccountId,
    /// Accounts that must sign
    pub required_auths: BTreeSet<AccountId>,
    /// Application id
    pub id: u16,
    /// Payload
    pub data: Vec<u8>,
}

impl BaseOperation for CustomOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.payer
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.active.insert(self.payer);
        required.active.extend(self.required_auths.iter().copied());
    }
}

/// Chain-state predicate checked by [`AssertOperation`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Account has the given name
    AccountNameEqLit {
        /// Account checked
        account_id: AccountId,
        /// Expected name
        name: String,
    },
    /// Asset has the given symbol
    AssetSymbolEqLit {
        /// Asset checked
        asset_id: AssetId,
        /// Expected symbol
        symbol: String,
    },
    /// Block with this id is part of the chain
    BlockId {
        /// Expected block id
        id: BlockId,
    },
}

impl Predicate {
    /// Position of the predicate in the predicate variant
    pub fn opcode(&self) -> u8 {
        match self {
            Predicate::AccountNameEqLit { .. } => 0,
            Predicate::AssetSymbolEqLit { .. } => 1,
            Predicate::BlockId { .. } => 2,
        }
    }
}

/// Abort the transaction unless every predicate holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertOperation {
    /// Declared fee
    pub fee: Asset,
    /// Fee payer
    pub fee_paying_account: AccountId,
    /// Predicates checked
    pub predicates: Vec<Predicate>,
    /// Accounts that must sign
    pub required_auths: BTreeSet<AccountId>,
}

impl BaseOperation for AssertOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.fee_paying_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(!self.predicates.is_empty(), "assert requires at least one predicate")
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.active.insert(self.fee_paying_account);
        required.active.extend(self.required_auths.iter().copied());
    }
}

/// Claim a genesis balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceClaimOperation {
    /// Declared fee
    pub fee: Asset,
    /// Account credited, pays the fee
    pub deposit_to_account: AccountId,
    /// Balance claimed
    pub balance_to_claim: BalanceId,
    /// Key owning the balance
    pub balance_owner_key: PublicKey,
    /// Amount claimed
    pub total_claimed: Asset,
}

impl BaseOperation for BalanceClaimOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.deposit_to_account
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check(self.total_claimed.amount > 0, "claimed amount must be positive")
    }

    fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required
            .other
            .push(crate::types::Authority::from_key(self.balance_owner_key.clone()));
    }
}

/// Replace the transfer fee tables and daily limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSettingsOperation {
    /// Declared fee
    pub fee: Asset,
    /// Committee account
    pub issuer: AccountId,
    /// New transfer fee table
    pub transfer_fees: Vec<SettingsFee>,
    /// New blind transfer fee table
    pub blind_transfer_fees: Vec<SettingsFee>,
    /// New daily limit, unchanged when absent
    pub edc_transfers_daily_limit: Option<ShareType>,
}

impl BaseOperation for UpdateSettingsOperation {
    fn fee(&self) -> Asset {
        self.fee
    }

    fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let percents = self
            .transfer_fees
            .iter()
            .chain(self.blind_transfer_fees.iter());
        for entry in percents {
            check(
                !entry.percent.is_sign_negative(),
                "fee percent must be non-negative",
            )?;
        }
        if let Some(limit) = self.edc_transfers_daily_limit {
            check(limit >= 0, "daily limit must be non-negative")?;
        }
        Ok(())
    }
}
