//! Error types for the chain core
//!
//! Two classes of failure exist:
//!
//! - [`ValidationError`]: the operation is not admissible against current
//!   state. Deterministic, surfaced to the caller, rejects the whole
//!   transaction.
//! - [`Error::InvariantViolation`]: a programming error, e.g. `apply` called
//!   with a receipt from a different operation. Never reachable through valid
//!   input after a successful `evaluate`.

use crate::types::{Asset, AssetId, ShareType};
use thiserror::Error;

/// Result type for chain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chain errors
#[derive(Error, Debug)]
pub enum Error {
    /// Operation rejected during evaluation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Invariant violation (negative balance during apply, receipt mismatch, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True when the failure was caused by user input rather than a bug
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Borrow the validation error, if any
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

/// Precondition failures reported by `evaluate`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Sender is not whitelisted for the asset
    #[error("'from' account {from} is not whitelisted for asset {asset}")]
    FromAccountNotWhitelisted { from: String, asset: AssetId },

    /// Receiver is not whitelisted for the asset
    #[error("'to' account {to} is not whitelisted for asset {asset}")]
    ToAccountNotWhitelisted { to: String, asset: AssetId },

    /// Sender restricted by committee
    #[error("'from' account {from} is restricted by committee")]
    FromAccountRestricted { from: String },

    /// Receiver restricted by committee
    #[error("'to' account {to} is restricted by committee")]
    ToAccountRestricted { to: String },

    /// Transfer of a transfer-restricted asset not involving the issuer
    #[error("Asset {asset} has transfer_restricted flag enabled")]
    TransferRestrictedAsset { asset: AssetId },

    /// Override transfer on an asset without the override flag
    #[error("override_transfer not permitted for asset {asset}")]
    OverrideTransferNotPermitted { asset: AssetId },

    /// Actor is not allowed to perform this operation
    #[error("Account {account} is not authorized: {reason}")]
    Unauthorized { account: String, reason: String },

    /// Balance does not cover the requested debit
    #[error("Insufficient balance: account '{account}' has {balance}, needs {required}")]
    InsufficientBalance {
        account: String,
        balance: Asset,
        required: Asset,
    },

    /// Declared fee is lower than required
    #[error("Wrong fee amount ({declared}) sent. Required fee: {required}")]
    InsufficientFee { declared: Asset, required: Asset },

    /// Declared fee is in the wrong asset
    #[error("Wrong fee asset ({declared}) sent. Required fee asset: {required}")]
    WrongFeeAsset { declared: AssetId, required: AssetId },

    /// Reserve-asset daily volume exceeded
    #[error("Daily transfers limit exceeded. Current counter: {counter}, amount: {amount}, limit: {limit}")]
    DailyLimitExceeded {
        counter: ShareType,
        amount: ShareType,
        limit: ShareType,
    },

    /// Burn-mode receiver for a market-issued asset
    #[error("Cannot reserve (burn) {symbol} because it is a market-issued asset")]
    BurnMarketIssuedAsset { symbol: String },

    /// Burning would drive supply negative
    #[error("Cannot burn {burn} of {asset}: current supply is {supply}")]
    BurnSupplyUnderflow {
        asset: AssetId,
        supply: ShareType,
        burn: ShareType,
    },

    /// Cheque code has the wrong length
    #[error("invalid cheque code: expected {expected} characters, got {actual}")]
    MalformedChequeCode { expected: usize, actual: usize },

    /// No cheque with this code
    #[error("There is no cheque with this code")]
    ChequeNotFound,

    /// Cheque past its expiration
    #[error("Cheque {cheque} expired at {expiration}")]
    ChequeExpired { cheque: String, expiration: String },

    /// Cheque operation on a cheque that is no longer redeemable
    #[error("Cheque {cheque} is already used")]
    ChequeAlreadyUsed { cheque: String },

    /// Referenced object does not exist
    #[error("Object {id} not found")]
    ObjectNotFound { id: String },

    /// Assert operation predicate did not hold
    #[error("Assert predicate failed: {0}")]
    PredicateFailed(String),

    /// Stateless field validation failed
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Nested proposals exceed the recursion limit
    #[error("Proposal nesting exceeds maximum depth {max_depth}")]
    RecursionLimitExceeded { max_depth: u32 },

    /// Operation kind has no evaluator in this node
    #[error("Operation '{name}' is not supported by this evaluator set")]
    UnsupportedOperation { name: &'static str },

    /// Required authority not satisfied by the provided keys
    #[error("Missing {level} authority of account {account}")]
    MissingAuthority { account: String, level: &'static str },
}

impl ValidationError {
    /// Shorthand for stateless validation failures
    pub fn invalid(msg: impl Into<String>) -> Self {
        ValidationError::InvalidOperation(msg.into())
    }

    /// Shorthand for missing objects
    pub fn not_found(id: impl ToString) -> Self {
        ValidationError::ObjectNotFound { id: id.to_string() }
    }
}

/// Fail with a validation error unless `cond` holds
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($crate::error::Error::Validation($err));
        }
    };
}

pub(crate) use ensure;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_classified() {
        let err: Error = ValidationError::ChequeNotFound.into();
        assert!(err.is_validation());
        assert_eq!(err.as_validation(), Some(&ValidationError::ChequeNotFound));

        let err = Error::InvariantViolation("receipt mismatch".to_string());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = ValidationError::InsufficientBalance {
            account: "alice".to_string(),
            balance: Asset::new(10, AssetId::new(0)),
            required: Asset::new(42, AssetId::new(0)),
        };
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains("42"));
    }
}
