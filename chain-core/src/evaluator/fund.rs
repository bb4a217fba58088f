//! Fund evaluators

use super::{EvalContext, Evaluator};
use crate::error::{ensure, Result, ValidationError};
use crate::operations::FundRefillOperation;
use crate::store::LedgerStore;
use crate::transaction::OperationResult;
use crate::types::Asset;

/// Receipt of [`FundRefillEvaluator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundRefillReceipt {
    /// Amount moved into the fund
    pub amount: Asset,
}

/// Evaluator for [`FundRefillOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FundRefillEvaluator;

impl Evaluator for FundRefillEvaluator {
    type Op = FundRefillOperation;
    type Receipt = FundRefillReceipt;

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &FundRefillOperation,
    ) -> Result<FundRefillReceipt> {
        let from = store.get_account(op.from_account)?;
        let fund = store.get_fund(op.id)?;

        ensure!(
            fund.enabled,
            ValidationError::invalid(format!("fund {} is disabled", fund.name))
        );
        ensure!(
            op.amount.asset_id == fund.asset_id,
            ValidationError::invalid(format!(
                "fund {} holds {}, refill is in {}",
                fund.name, fund.asset_id, op.amount.asset_id
            ))
        );

        let balance = store.get_balance(from.id, op.amount.asset_id);
        ensure!(
            balance.amount >= op.amount.amount,
            ValidationError::InsufficientBalance {
                account: from.name.clone(),
                balance,
                required: op.amount,
            }
        );

        Ok(FundRefillReceipt { amount: op.amount })
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &FundRefillOperation,
        receipt: FundRefillReceipt,
    ) -> Result<OperationResult> {
        store.adjust_balance(op.from_account, -receipt.amount)?;
        store.modify_fund(op.id, |fund| {
            fund.balance += receipt.amount.amount;
        })?;
        Ok(OperationResult::Void)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{AssetObject, AssetOptions, FundObject};
    use crate::operations::{FundOptions, FundRate, PaymentRate};
    use crate::store::InMemoryStore;
    use crate::types::{AccountId, AssetId, FundId, PublicKey};

    const USD: AssetId = AssetId::new(1);

    fn setup(enabled: bool) -> (InMemoryStore, AccountId, FundId) {
        let mut store = InMemoryStore::default();
        let owner = store.create_account("owner", PublicKey::new("owner-key"));
        store.insert_asset(
            AssetObject {
                id: USD,
                symbol: "USD".to_string(),
                precision: 2,
                issuer: owner,
                options: AssetOptions::new(USD),
                market_issued: false,
            },
            0,
        );
        store.issue(owner, Asset::new(500, USD)).unwrap();
        let id = FundId::new(0);
        store.insert_fund(FundObject {
            id,
            name: "growth".to_string(),
            owner,
            asset_id: USD,
            balance: 0,
            enabled,
            options: FundOptions {
                description: String::new(),
                period: 30,
                min_deposit: 10,
                rates_reduction_per_month: 0,
                fund_rates: vec![FundRate {
                    amount: 100,
                    day_percent: 10,
                }],
                payment_rates: vec![PaymentRate {
                    period: 30,
                    percent: 300,
                }],
            },
        });
        (store, owner, id)
    }

    fn refill(owner: AccountId, id: FundId, amount: Asset) -> FundRefillOperation {
        FundRefillOperation {
            fee: Asset::zero(USD),
            from_account: owner,
            id,
            amount,
        }
    }

    #[test]
    fn test_refill_moves_balance_into_fund() {
        let (mut store, owner, id) = setup(true);
        let ctx = EvalContext::resolve(&store);
        let op = refill(owner, id, Asset::new(200, USD));

        let receipt = FundRefillEvaluator.evaluate(&store, &ctx, &op).unwrap();
        FundRefillEvaluator.apply(&mut store, &ctx, &op, receipt).unwrap();

        assert_eq!(store.get_balance(owner, USD).amount, 300);
        assert_eq!(store.get_fund(id).unwrap().balance, 200);
    }

    #[test]
    fn test_refill_requires_enabled_fund_and_matching_asset() {
        let (store, owner, id) = setup(false);
        let ctx = EvalContext::resolve(&store);
        assert!(FundRefillEvaluator
            .evaluate(&store, &ctx, &refill(owner, id, Asset::new(1, USD)))
            .is_err());

        let (store, owner, id) = setup(true);
        assert!(FundRefillEvaluator
            .evaluate(&store, &ctx, &refill(owner, id, Asset::new(1, AssetId::new(0))))
            .is_err());

        let err = FundRefillEvaluator
            .evaluate(&store, &ctx, &refill(owner, id, Asset::new(501, USD)))
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::InsufficientBalance { .. })
        ));

        let err = FundRefillEvaluator
            .evaluate(&store, &ctx, &refill(owner, FundId::new(9), Asset::new(1, USD)))
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::ObjectNotFound { .. })
        ));
    }
}
