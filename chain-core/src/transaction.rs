//! Transactions and operation results

use crate::error::Result;
use crate::operations::Operation;
use crate::types::{Asset, ObjectId, PublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Ordered list of operations applied all-or-nothing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Operations, applied in order
    pub operations: Vec<Operation>,
    /// Keys that signed the transaction
    ///
    /// When empty the processor skips the authority check.
    pub signing_keys: BTreeSet<PublicKey>,
}

impl Transaction {
    /// Create from operations
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            signing_keys: BTreeSet::new(),
        }
    }

    /// Add a signing key
    pub fn signed_by(mut self, key: PublicKey) -> Self {
        self.signing_keys.insert(key);
        self
    }

    /// Canonical transaction id (hex SHA-256 of the encoded operations)
    pub fn id(&self) -> Result<String> {
        let bytes = bincode::serialize(&self.operations)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Result returned by `apply`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    /// Nothing to report
    #[default]
    Void,
    /// Id of a created object
    Object(ObjectId),
    /// Amount charged or paid out
    Asset(Asset),
}

/// Outcome of an applied transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTransaction {
    /// Transaction id
    pub trx_id: String,
    /// Result of each operation, in order
    pub results: Vec<OperationResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::TransferOperation;
    use crate::types::{AccountId, AssetId};

    fn transfer(amount: i64) -> Operation {
        TransferOperation {
            fee: Asset::zero(AssetId::new(0)),
            from: AccountId::new(1),
            to: AccountId::new(2),
            amount: Asset::new(amount, AssetId::new(0)),
            memo: None,
        }
        .into()
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = Transaction::new(vec![transfer(5)]);
        let b = Transaction::new(vec![transfer(5)]).signed_by(PublicKey::new("k"));
        assert_eq!(a.id().unwrap(), b.id().unwrap());
        assert_eq!(a.id().unwrap().len(), 64);

        let c = Transaction::new(vec![transfer(6)]);
        assert_ne!(a.id().unwrap(), c.id().unwrap());
    }
}
