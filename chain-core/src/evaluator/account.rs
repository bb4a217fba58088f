//! Account flag and settings evaluators

use super::{EvalContext, Evaluator};
use crate::error::{ensure, Result, ValidationError};
use crate::operations::{
    AccountEdcLimitDailyVolumeOperation, SetBurningModeOperation, UpdateSettingsOperation,
};
use crate::store::LedgerStore;
use crate::transaction::OperationResult;
use crate::types::COMMITTEE_ACCOUNT;

/// Evaluator for [`SetBurningModeOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SetBurningModeEvaluator;

impl Evaluator for SetBurningModeEvaluator {
    type Op = SetBurningModeOperation;
    type Receipt = ();

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &SetBurningModeOperation,
    ) -> Result<()> {
        store.get_account(op.account_id)?;
        Ok(())
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &SetBurningModeOperation,
        _receipt: (),
    ) -> Result<OperationResult> {
        store.modify_account(op.account_id, |account| {
            account.burning_mode_enabled = op.enabled;
        })?;
        Ok(OperationResult::Void)
    }
}

/// Evaluator for [`AccountEdcLimitDailyVolumeOperation`]
///
/// Only the issuer of the reserve asset may toggle enforcement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountEdcLimitDailyVolumeEvaluator;

impl Evaluator for AccountEdcLimitDailyVolumeEvaluator {
    type Op = AccountEdcLimitDailyVolumeOperation;
    type Receipt = ();

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &AccountEdcLimitDailyVolumeOperation,
    ) -> Result<()> {
        let reserve = store.get_asset(store.chain_parameters().reserve_asset)?;
        ensure!(
            op.issuer == reserve.issuer,
            ValidationError::Unauthorized {
                account: op.issuer.to_string(),
                reason: format!("not the issuer of {}", reserve.symbol),
            }
        );
        store.get_account(op.account_id)?;
        Ok(())
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &AccountEdcLimitDailyVolumeOperation,
        _receipt: (),
    ) -> Result<OperationResult> {
        store.modify_account(op.account_id, |account| {
            account.edc_limit_daily_volume_enabled = op.enabled;
        })?;
        Ok(OperationResult::Void)
    }
}

/// Evaluator for [`UpdateSettingsOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateSettingsEvaluator;

impl Evaluator for UpdateSettingsEvaluator {
    type Op = UpdateSettingsOperation;
    type Receipt = ();

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &UpdateSettingsOperation,
    ) -> Result<()> {
        ensure!(
            op.issuer == COMMITTEE_ACCOUNT,
            ValidationError::Unauthorized {
                account: op.issuer.to_string(),
                reason: "only the committee may update settings".to_string(),
            }
        );
        for entry in op.transfer_fees.iter().chain(&op.blind_transfer_fees) {
            store.get_asset(entry.asset_id)?;
        }
        Ok(())
    }

    fn apply<S: LedgerStore>(
        &self,
        store: &mut S,
        _ctx: &EvalContext,
        op: &UpdateSettingsOperation,
        _receipt: (),
    ) -> Result<OperationResult> {
        store.modify_settings(|settings| {
            settings.transfer_fees = op.transfer_fees.clone();
            settings.blind_transfer_fees = op.blind_transfer_fees.clone();
            if let Some(limit) = op.edc_transfers_daily_limit {
                settings.edc_transfers_daily_limit = limit;
            }
        })?;
        tracing::info!(
            transfer_fees = op.transfer_fees.len(),
            blind_transfer_fees = op.blind_transfer_fees.len(),
            "Settings updated"
        );
        Ok(OperationResult::Void)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{AssetObject, AssetOptions, SettingsFee};
    use crate::store::InMemoryStore;
    use crate::types::{AccountId, Asset, AssetId, PublicKey, CORE_ASSET};
    use rust_decimal::Decimal;

    fn store_with_reserve() -> (InMemoryStore, AccountId, AccountId) {
        let mut store = InMemoryStore::default();
        let committee = store.create_account("committee", PublicKey::new("c"));
        let alice = store.create_account("alice", PublicKey::new("a"));
        let reserve = store.chain_parameters().reserve_asset;
        store.insert_asset(
            AssetObject {
                id: reserve,
                symbol: "EDC".to_string(),
                precision: 3,
                issuer: committee,
                options: AssetOptions::new(reserve),
                market_issued: false,
            },
            0,
        );
        (store, committee, alice)
    }

    #[test]
    fn test_set_burning_mode() {
        let (mut store, _, alice) = store_with_reserve();
        let ctx = EvalContext::resolve(&store);
        let op = SetBurningModeOperation {
            fee: Asset::zero(CORE_ASSET),
            account_id: alice,
            enabled: true,
        };
        SetBurningModeEvaluator.evaluate(&store, &ctx, &op).unwrap();
        SetBurningModeEvaluator.apply(&mut store, &ctx, &op, ()).unwrap();
        assert!(store.get_account(alice).unwrap().burning_mode_enabled);

        let missing = SetBurningModeOperation {
            account_id: AccountId::new(42),
            ..op
        };
        assert!(SetBurningModeEvaluator.evaluate(&store, &ctx, &missing).is_err());
    }

    #[test]
    fn test_daily_volume_toggle_requires_reserve_issuer() {
        let (mut store, committee, alice) = store_with_reserve();
        let ctx = EvalContext::resolve(&store);
        let op = AccountEdcLimitDailyVolumeOperation {
            fee: Asset::zero(CORE_ASSET),
            issuer: alice,
            account_id: alice,
            enabled: true,
        };
        let err = AccountEdcLimitDailyVolumeEvaluator
            .evaluate(&store, &ctx, &op)
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::Unauthorized { .. })
        ));

        let op = AccountEdcLimitDailyVolumeOperation {
            issuer: committee,
            ..op
        };
        AccountEdcLimitDailyVolumeEvaluator
            .evaluate(&store, &ctx, &op)
            .unwrap();
        AccountEdcLimitDailyVolumeEvaluator
            .apply(&mut store, &ctx, &op, ())
            .unwrap();
        assert!(store.get_account(alice).unwrap().edc_limit_daily_volume_enabled);
    }

    #[test]
    fn test_update_settings_replaces_tables() {
        let (mut store, committee, _) = store_with_reserve();
        assert_eq!(committee, COMMITTEE_ACCOUNT);
        let ctx = EvalContext::resolve(&store);
        let reserve = store.chain_parameters().reserve_asset;
        let op = UpdateSettingsOperation {
            fee: Asset::zero(CORE_ASSET),
            issuer: committee,
            transfer_fees: vec![SettingsFee {
                asset_id: reserve,
                percent: Decimal::new(25, 1),
            }],
            blind_transfer_fees: vec![],
            edc_transfers_daily_limit: Some(1_000),
        };
        UpdateSettingsEvaluator.evaluate(&store, &ctx, &op).unwrap();
        UpdateSettingsEvaluator.apply(&mut store, &ctx, &op, ()).unwrap();
        assert_eq!(
            store.settings().transfer_fee_percent(reserve),
            Some(Decimal::new(25, 1))
        );
        assert_eq!(store.settings().edc_transfers_daily_limit, 1_000);

        let unknown_asset = UpdateSettingsOperation {
            transfer_fees: vec![SettingsFee {
                asset_id: AssetId::new(77),
                percent: Decimal::ONE,
            }],
            ..op
        };
        assert!(UpdateSettingsEvaluator
            .evaluate(&store, &ctx, &unknown_asset)
            .is_err());
    }
}
