//! Cheque evaluators

use super::transfer::{is_authorized_asset, not_restricted_account};
use super::{EvalContext, Evaluator};
use crate::cheque::{self, ChequeObject, ChequeStatus};
use crate::error::{ensure, Result, ValidationError};
use crate::objects::Directionality;
use crate::operations::{ChequeCreateOperation, ChequeReverseOperation, ChequeUseOperation};
use crate::store::LedgerStore;
use crate::transaction::OperationResult;
use crate::types::{Asset, ChequeId, ShareType};

/// Receipt of [`ChequeCreateEvaluator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChequeCreateReceipt {
    /// Amount locked from the drawer
    pub total: Asset,
}

/// Evaluator for [`ChequeCreateOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChequeCreateEvaluator;

impl Evaluator for ChequeCreateEvaluator {
    type Op = ChequeCreateOperation;
    type Receipt = ChequeCreateReceipt;

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        ctx: &EvalContext,
        op: &ChequeCreateOperation,
    ) -> Result<ChequeCreateReceipt> {
        let drawer = store.get_account(op.account_id)?;
        let asset = store.get_asset(op.payee_amount.asset_id)?;

        ensure!(
            store.find_cheque_by_code(&op.code).is_none(),
            ValidationError::invalid("cheque code already in use")
        );
        ensure!(
            op.expiration_datetime > ctx.now,
            ValidationError::invalid(format!(
                "cheque expiration {} is not after head block time {}",
                op.expiration_datetime, ctx.now
            ))
        );
        ensure!(
            is_authorized_asset(drawer, asset),
            ValidationError::FromAccountNotWhitelisted {
                from: drawer.name.clone(),
                asset: asset.id,
            }
        );
        ensure!(
            not_restricted_account(store, drawer.id, Directionality::Payer),
            ValidationError::FromAccountRestricted {
                from: drawer.name.clone()
            }
        );

        let total = op
            .payee_amount
            .amount
            .checked_mul(ShareType::from(op.payee_count))
            .map(|amount| asset.amount(amount))
            .ok_or_else(|| ValidationError::invalid("cheque total overflow"))?;
        let balance = store.get_balance(drawer.id, asset.id);
        ensure!(
            balance.amount >= total.amount,
            ValidationError::InsufficientBalance {
                account: drawer.name.clone(),
                balance,
                required: total,
            }
        );

        Ok(ChequeCreateReceipt { total })
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        ctx: &EvalContext,
        op: &ChequeCreateOperation,
        receipt: ChequeCreateReceipt,
    ) -> Result<OperationResult> {
        store.adjust_balance(op.account_id, -receipt.total)?;

        let mut cheque = ChequeObject {
            code: op.code.clone(),
            datetime_creation: ctx.now,
            datetime_expiration: op.expiration_datetime,
            drawer: op.account_id,
            amount_payee: op.payee_amount.amount,
            amount_remaining: receipt.total.amount,
            asset_id: op.payee_amount.asset_id,
            status: ChequeStatus::New,
            ..Default::default()
        };
        cheque.allocate_payees(op.payee_count);
        let id = store.create_cheque(cheque)?;

        tracing::debug!(
            cheque = %id,
            drawer = %op.account_id,
            total = %receipt.total,
            payees = op.payee_count,
            "Cheque created"
        );
        Ok(OperationResult::Object(id.into()))
    }
}

/// Receipt of [`ChequeUseEvaluator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChequeUseReceipt {
    /// Cheque redeemed
    pub cheque_id: ChequeId,
}

/// Evaluator for [`ChequeUseOperation`]
///
/// Redeeming a cheque that is already used is accepted and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChequeUseEvaluator;

impl Evaluator for ChequeUseEvaluator {
    type Op = ChequeUseOperation;
    type Receipt = ChequeUseReceipt;

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        ctx: &EvalContext,
        op: &ChequeUseOperation,
    ) -> Result<ChequeUseReceipt> {
        let payee = store.get_account(op.account_id)?;
        let cheque = cheque::find_cheque_by_code(store, &op.code)?;
        let receipt = ChequeUseReceipt {
            cheque_id: cheque.id,
        };
        if cheque.status == ChequeStatus::Used {
            return Ok(receipt);
        }

        ensure!(
            !cheque.is_expired(ctx.now),
            ValidationError::ChequeExpired {
                cheque: cheque.id.to_string(),
                expiration: cheque.datetime_expiration.to_rfc3339(),
            }
        );
        ensure!(
            op.amount == cheque.payee_amount(),
            ValidationError::invalid(format!(
                "cheque pays {} per payee, {} requested",
                cheque.payee_amount(),
                op.amount
            ))
        );

        let asset = store.get_asset(cheque.asset_id)?;
        ensure!(
            is_authorized_asset(payee, asset),
            ValidationError::ToAccountNotWhitelisted {
                to: payee.name.clone(),
                asset: asset.id,
            }
        );
        ensure!(
            not_restricted_account(store, payee.id, Directionality::Receiver),
            ValidationError::ToAccountRestricted {
                to: payee.name.clone()
            }
        );

        Ok(receipt)
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &ChequeUseOperation,
        receipt: ChequeUseReceipt,
    ) -> Result<OperationResult> {
        let payout = cheque::process_payee(store, receipt.cheque_id, op.account_id)?;
        Ok(payout.map_or(OperationResult::Void, OperationResult::Asset))
    }
}

/// Receipt of [`ChequeReverseEvaluator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChequeReverseReceipt {
    /// Amount returned to the drawer
    pub refund: Asset,
}

/// Evaluator for [`ChequeReverseOperation`]
///
/// The drawer takes back the unredeemed remainder and the cheque becomes
/// used.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChequeReverseEvaluator;

impl Evaluator for ChequeReverseEvaluator {
    type Op = ChequeReverseOperation;
    type Receipt = ChequeReverseReceipt;

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &ChequeReverseOperation,
    ) -> Result<ChequeReverseReceipt> {
        let drawer = store.get_account(op.account_id)?;
        let cheque = store.get_cheque(op.cheque_id)?;

        ensure!(
            cheque.drawer == drawer.id,
            ValidationError::Unauthorized {
                account: drawer.name.clone(),
                reason: format!("not the drawer of cheque {}", cheque.id),
            }
        );
        ensure!(
            cheque.status == ChequeStatus::New,
            ValidationError::ChequeAlreadyUsed {
                cheque: cheque.id.to_string()
            }
        );

        let refund = Asset::new(cheque.amount_remaining, cheque.asset_id);
        ensure!(
            op.amount == refund,
            ValidationError::invalid(format!(
                "cheque holds {}, {} requested",
                refund, op.amount
            ))
        );

        Ok(ChequeReverseReceipt { refund })
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        ctx: &EvalContext,
        op: &ChequeReverseOperation,
        receipt: ChequeReverseReceipt,
    ) -> Result<OperationResult> {
        let now = ctx.now;
        store.modify_cheque(op.cheque_id, |cheque| {
            cheque.amount_remaining = 0;
            cheque.status = ChequeStatus::Used;
            cheque.datetime_used = Some(now);
        })?;
        store.adjust_balance(op.account_id, receipt.refund)?;
        Ok(OperationResult::Asset(receipt.refund))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{AccountRestriction, AssetObject, AssetOptions};
    use crate::store::InMemoryStore;
    use crate::types::{AccountId, AssetId, ObjectId, PublicKey, Timestamp};
    use chrono::{Duration, TimeZone, Utc};

    const USD: AssetId = AssetId::new(1);
    const CODE: &str = "ABCDEFGH12345678";

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (InMemoryStore, AccountId, AccountId) {
        let mut store = InMemoryStore::default();
        store.set_head_block_time(now());
        let drawer = store.create_account("drawer", PublicKey::new("drawer-key"));
        let payee = store.create_account("payee", PublicKey::new("payee-key"));
        store.insert_asset(
            AssetObject {
                id: USD,
                symbol: "USD".to_string(),
                precision: 2,
                issuer: drawer,
                options: AssetOptions::new(USD),
                market_issued: false,
            },
            0,
        );
        store.issue(drawer, Asset::new(100, USD)).unwrap();
        (store, drawer, payee)
    }

    fn create_op(drawer: AccountId, count: u32) -> ChequeCreateOperation {
        ChequeCreateOperation {
            fee: Asset::zero(USD),
            account_id: drawer,
            code: CODE.to_string(),
            payee_amount: Asset::new(10, USD),
            payee_count: count,
            expiration_datetime: now() + Duration::days(1),
        }
    }

    fn create(store: &mut InMemoryStore, drawer: AccountId, count: u32) -> ChequeId {
        let ctx = EvalContext::resolve(store);
        let op = create_op(drawer, count);
        let receipt = ChequeCreateEvaluator.evaluate(store, &ctx, &op).unwrap();
        match ChequeCreateEvaluator.apply(store, &ctx, &op, receipt).unwrap() {
            OperationResult::Object(id) => ChequeId::new(id.instance),
            other => panic!("unexpected result {:?}", other),
        }
    }

    fn use_op(payee: AccountId) -> ChequeUseOperation {
        ChequeUseOperation {
            fee: Asset::zero(USD),
            account_id: payee,
            code: CODE.to_string(),
            amount: Asset::new(10, USD),
        }
    }

    fn redeem(store: &mut InMemoryStore, payee: AccountId) -> Result<OperationResult> {
        let ctx = EvalContext::resolve(store);
        let op = use_op(payee);
        let receipt = ChequeUseEvaluator.evaluate(store, &ctx, &op)?;
        ChequeUseEvaluator.apply(store, &ctx, &op, receipt)
    }

    #[test]
    fn test_create_locks_total() {
        let (mut store, drawer, _) = setup();
        let id = create(&mut store, drawer, 3);

        assert_eq!(store.get_balance(drawer, USD).amount, 70);
        let cheque = store.get_cheque(id).unwrap();
        assert_eq!(cheque.amount_remaining, 30);
        assert_eq!(cheque.payees.len(), 3);
        assert_eq!(cheque.datetime_creation, now());
        assert_eq!(ObjectId::from(id).to_string(), "1.18.0");
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (mut store, drawer, _) = setup();
        let ctx = EvalContext::resolve(&store);

        let err = ChequeCreateEvaluator
            .evaluate(&store, &ctx, &create_op(drawer, 11))
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::InsufficientBalance { .. })
        ));

        let mut expired = create_op(drawer, 1);
        expired.expiration_datetime = now();
        assert!(ChequeCreateEvaluator.evaluate(&store, &ctx, &expired).is_err());

        create(&mut store, drawer, 1);
        let err = ChequeCreateEvaluator
            .evaluate(&store, &ctx, &create_op(drawer, 1))
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_redeem_until_used_then_noop() {
        let (mut store, drawer, payee) = setup();
        let id = create(&mut store, drawer, 3);

        let paid = redeem(&mut store, payee).unwrap();
        assert_eq!(paid, OperationResult::Asset(Asset::new(10, USD)));
        let cheque = store.get_cheque(id).unwrap();
        assert_eq!(cheque.amount_remaining, 20);
        assert_eq!(cheque.status, ChequeStatus::New);

        redeem(&mut store, payee).unwrap();
        redeem(&mut store, payee).unwrap();
        let cheque = store.get_cheque(id).unwrap();
        assert_eq!(cheque.amount_remaining, 0);
        assert_eq!(cheque.status, ChequeStatus::Used);
        assert_eq!(store.get_balance(payee, USD).amount, 30);

        let before = store.clone();
        assert_eq!(redeem(&mut store, payee).unwrap(), OperationResult::Void);
        assert_eq!(store, before);
    }

    #[test]
    fn test_redeem_checks_code_and_amount() {
        let (mut store, drawer, payee) = setup();
        create(&mut store, drawer, 1);
        let ctx = EvalContext::resolve(&store);

        let mut op = use_op(payee);
        op.code = "short".to_string();
        let err = ChequeUseEvaluator.evaluate(&store, &ctx, &op).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::MalformedChequeCode { .. })
        ));

        op.code = "ZZZZZZZZ12345678".to_string();
        let err = ChequeUseEvaluator.evaluate(&store, &ctx, &op).unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::ChequeNotFound));

        let mut op = use_op(payee);
        op.amount = Asset::new(9, USD);
        assert!(ChequeUseEvaluator.evaluate(&store, &ctx, &op).is_err());
    }

    #[test]
    fn test_redeem_after_expiration_fails() {
        let (mut store, drawer, payee) = setup();
        create(&mut store, drawer, 1);
        store.set_head_block_time(now() + Duration::days(1));

        let err = redeem(&mut store, payee).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::ChequeExpired { .. })
        ));
    }

    #[test]
    fn test_restricted_payee_cannot_redeem() {
        let (mut store, drawer, payee) = setup();
        create(&mut store, drawer, 1);
        store.set_restriction(AccountRestriction {
            account: payee,
            restriction_type: Directionality::Receiver,
        });
        let err = redeem(&mut store, payee).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::ToAccountRestricted { .. })
        ));
    }

    #[test]
    fn test_reverse_refunds_remainder() {
        let (mut store, drawer, payee) = setup();
        let id = create(&mut store, drawer, 3);
        redeem(&mut store, payee).unwrap();
        let ctx = EvalContext::resolve(&store);

        let op = ChequeReverseOperation {
            fee: Asset::zero(USD),
            account_id: payee,
            cheque_id: id,
            amount: Asset::new(20, USD),
        };
        let err = ChequeReverseEvaluator.evaluate(&store, &ctx, &op).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::Unauthorized { .. })
        ));

        let op = ChequeReverseOperation {
            account_id: drawer,
            ..op
        };
        let receipt = ChequeReverseEvaluator.evaluate(&store, &ctx, &op).unwrap();
        let result = ChequeReverseEvaluator
            .apply(&mut store, &ctx, &op, receipt)
            .unwrap();
        assert_eq!(result, OperationResult::Asset(Asset::new(20, USD)));
        assert_eq!(store.get_balance(drawer, USD).amount, 90);

        let cheque = store.get_cheque(id).unwrap();
        assert_eq!(cheque.status, ChequeStatus::Used);
        assert_eq!(cheque.amount_remaining, 0);

        let err = ChequeReverseEvaluator.evaluate(&store, &ctx, &op).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::ChequeAlreadyUsed { .. })
        ));
    }
}
