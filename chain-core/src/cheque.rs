//! Cheque engine
//!
//! A cheque is a pre-funded, multi-payee, single-use redemption object. The
//! drawer locks `amount_payee * payees` when the cheque is created; each
//! redemption claims the first unfilled payee slot.
//!
//! # State machine
//!
//! ```text
//! cheque:  new ──(last slot filled)──▶ used
//! slot:    new ──(claimed)───────────▶ used
//! ```
//!
//! Redeeming a `used` cheque is a no-op, not an error.

use crate::error::{Error, Result, ValidationError};
use crate::store::LedgerStore;
use crate::types::{AccountId, Asset, AssetId, ChequeId, ShareType, Timestamp};
use serde::{Deserialize, Serialize};

/// Length of a cheque redemption code
pub const CHEQUE_CODE_LENGTH: usize = 16;

/// Most payee slots a single cheque may have
pub const MAX_CHEQUE_PAYEES: u32 = 1_000;

/// Cheque and payee slot status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChequeStatus {
    /// Not yet redeemed
    #[default]
    New,
    /// Redeemed (terminal)
    Used,
}

/// One payee slot of a cheque
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayeeSlot {
    /// Slot status
    pub status: ChequeStatus,
    /// Account that claimed the slot
    pub payee: Option<AccountId>,
    /// Time the slot was claimed
    pub datetime_used: Option<Timestamp>,
}

/// Cheque object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChequeObject {
    /// Cheque id
    pub id: ChequeId,
    /// Opaque redemption code
    pub code: String,
    /// Creation time
    pub datetime_creation: Timestamp,
    /// Expiration time
    pub datetime_expiration: Timestamp,
    /// Time the last slot was claimed
    pub datetime_used: Option<Timestamp>,
    /// Account that funded the cheque
    pub drawer: AccountId,
    /// Amount paid to each payee
    pub amount_payee: ShareType,
    /// Locked amount not yet paid out
    pub amount_remaining: ShareType,
    /// Cheque asset
    pub asset_id: AssetId,
    /// Cheque status
    pub status: ChequeStatus,
    /// Ordered payee slots
    pub payees: Vec<PayeeSlot>,
}

impl ChequeObject {
    /// Reset the payee slots to `count` empty slots
    pub fn allocate_payees(&mut self, count: u32) {
        self.payees = vec![PayeeSlot::default(); count as usize];
    }

    /// Amount paid to each payee
    pub fn payee_amount(&self) -> Asset {
        Asset::new(self.amount_payee, self.asset_id)
    }

    /// Number of slots already claimed
    pub fn used_slots(&self) -> usize {
        self.payees
            .iter()
            .filter(|slot| slot.status == ChequeStatus::Used)
            .count()
    }

    /// Whether the cheque has passed its expiration
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.datetime_expiration
    }

    /// Claim the first unfilled slot for `payee`
    ///
    /// Returns the amount to credit to `payee`, or `None` when the cheque is
    /// already used. The caller is responsible for crediting the balance.
    pub fn process_payee(&mut self, payee: AccountId, now: Timestamp) -> Result<Option<Asset>> {
        if self.status == ChequeStatus::Used {
            return Ok(None);
        }
        if self.payees.is_empty() {
            return Err(Error::InvariantViolation(format!(
                "cheque {} has no payee slots",
                self.id
            )));
        }

        let slot = self
            .payees
            .iter_mut()
            .find(|slot| slot.status == ChequeStatus::New);

        let payout = match slot {
            Some(slot) => {
                slot.status = ChequeStatus::Used;
                slot.payee = Some(payee);
                slot.datetime_used = Some(now);
                self.amount_remaining -= self.amount_payee;
                Some(self.payee_amount())
            }
            None => None,
        };

        if self.used_slots() == self.payees.len() {
            self.status = ChequeStatus::Used;
            self.datetime_used = Some(now);
        }

        Ok(payout)
    }
}

/// Redemption summary returned by code lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeInfo {
    /// Cheque id
    pub id: ChequeId,
    /// Expiration time
    pub datetime_expiration: Timestamp,
    /// Amount paid to each payee
    pub payee_amount: Asset,
}

impl From<&ChequeObject> for ChequeInfo {
    fn from(cheque: &ChequeObject) -> Self {
        Self {
            id: cheque.id,
            datetime_expiration: cheque.datetime_expiration,
            payee_amount: cheque.payee_amount(),
        }
    }
}

/// Reject codes that are not exactly [`CHEQUE_CODE_LENGTH`] characters
pub fn validate_cheque_code(code: &str) -> std::result::Result<(), ValidationError> {
    let actual = code.chars().count();
    if actual != CHEQUE_CODE_LENGTH {
        return Err(ValidationError::MalformedChequeCode {
            expected: CHEQUE_CODE_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// Look up a cheque by its redemption code
pub fn find_cheque_by_code<'a, S: LedgerStore>(store: &'a S, code: &str) -> Result<&'a ChequeObject> {
    validate_cheque_code(code)?;
    store
        .find_cheque_by_code(code)
        .ok_or_else(|| ValidationError::ChequeNotFound.into())
}

/// Redeem one slot of a cheque for `payee` and credit the payout
///
/// Returns the credited amount, or `None` for an already used cheque.
pub fn process_payee<S: LedgerStore>(
    store: &mut S,
    cheque_id: ChequeId,
    payee: AccountId,
) -> Result<Option<Asset>> {
    let now = store.head_block_time();
    let mut payout = Ok(None);
    store.modify_cheque(cheque_id, |cheque| {
        payout = cheque.process_payee(payee, now);
    })?;

    let payout = payout?;
    if let Some(amount) = payout {
        store.adjust_balance(payee, amount)?;
        tracing::debug!(
            cheque = %cheque_id,
            payee = %payee,
            amount = amount.amount,
            "Cheque slot redeemed"
        );
    }
    Ok(payout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cheque(slots: u32, amount_payee: ShareType) -> ChequeObject {
        let mut cheque = ChequeObject {
            id: ChequeId::new(1),
            code: "ABCDEFGH12345678".to_string(),
            amount_payee,
            amount_remaining: amount_payee * ShareType::from(slots),
            asset_id: AssetId::new(1),
            ..Default::default()
        };
        cheque.allocate_payees(slots);
        cheque
    }

    #[test]
    fn test_process_payee_fills_slots_in_order() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut cheque = cheque(3, 10);

        let paid = cheque.process_payee(AccountId::new(7), now).unwrap();
        assert_eq!(paid, Some(Asset::new(10, AssetId::new(1))));
        assert_eq!(cheque.amount_remaining, 20);
        assert_eq!(cheque.status, ChequeStatus::New);
        assert_eq!(cheque.payees[0].payee, Some(AccountId::new(7)));
        assert_eq!(cheque.payees[1].status, ChequeStatus::New);

        cheque.process_payee(AccountId::new(8), now).unwrap();
        cheque.process_payee(AccountId::new(9), now).unwrap();
        assert_eq!(cheque.amount_remaining, 0);
        assert_eq!(cheque.status, ChequeStatus::Used);
        assert_eq!(cheque.datetime_used, Some(now));
    }

    #[test]
    fn test_used_cheque_is_noop() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut cheque = cheque(1, 5);
        cheque.process_payee(AccountId::new(7), now).unwrap();
        let before = cheque.clone();

        let paid = cheque.process_payee(AccountId::new(8), now).unwrap();
        assert_eq!(paid, None);
        assert_eq!(cheque, before);
    }

    #[test]
    fn test_same_payee_may_take_several_slots() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut cheque = cheque(2, 5);
        cheque.process_payee(AccountId::new(7), now).unwrap();
        cheque.process_payee(AccountId::new(7), now).unwrap();
        assert_eq!(cheque.status, ChequeStatus::Used);
        assert!(cheque
            .payees
            .iter()
            .all(|slot| slot.payee == Some(AccountId::new(7))));
    }

    #[test]
    fn test_slotless_cheque_is_invariant_violation() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut cheque = cheque(0, 5);
        let err = cheque.process_payee(AccountId::new(7), now).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_code_length_validation() {
        assert!(validate_cheque_code("ABCDEFGH12345678").is_ok());
        assert_eq!(
            validate_cheque_code("short"),
            Err(ValidationError::MalformedChequeCode {
                expected: 16,
                actual: 5
            })
        );
    }
}
