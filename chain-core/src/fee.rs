//! Balance and fee policy
//!
//! Two kinds of fee exist:
//!
//! - the flat per-kind fee from the [`FeeSchedule`], denominated in the core
//!   asset and converted through the fee asset's core exchange rate;
//! - the custom percent fee of the transfer family, looked up per asset in
//!   the settings fee tables and computed in exact decimal arithmetic.

use crate::epoch::PolicyEpoch;
use crate::error::ValidationError;
use crate::objects::{AssetObject, SettingsObject};
use crate::operations::Operation;
use crate::types::{Asset, ShareType, CORE_ASSET};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat fees per operation kind, in the core asset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fee for kinds without an explicit entry
    pub default_fee: ShareType,
    /// Fee by operation name
    pub fees: BTreeMap<String, ShareType>,
}

impl FeeSchedule {
    /// Schedule charging nothing
    pub fn free() -> Self {
        Self::default()
    }

    /// Set the fee for one operation kind
    pub fn with_fee(mut self, name: impl Into<String>, fee: ShareType) -> Self {
        self.fees.insert(name.into(), fee);
        self
    }

    /// Flat fee for an operation kind, in the core asset
    pub fn core_fee(&self, op: &Operation) -> Asset {
        let amount = self
            .fees
            .get(op.name())
            .copied()
            .unwrap_or(self.default_fee);
        Asset::new(amount, CORE_ASSET)
    }

    /// Flat fee for an operation, converted into `fee_asset`
    ///
    /// Conversion rounds up so the payer never underpays.
    pub fn required_fee(
        &self,
        op: &Operation,
        fee_asset: &AssetObject,
    ) -> Result<Asset, ValidationError> {
        let core_fee = self.core_fee(op);
        if fee_asset.id == CORE_ASSET || core_fee.amount == 0 {
            return Ok(Asset::new(core_fee.amount, fee_asset.id));
        }
        fee_asset
            .options
            .core_exchange_rate
            .convert_round_up(core_fee)
            .filter(|fee| fee.asset_id == fee_asset.id)
            .ok_or_else(|| {
                ValidationError::invalid(format!(
                    "asset {} has no usable core exchange rate",
                    fee_asset.symbol
                ))
            })
    }
}

/// `round(amount * percent / 100)`, midpoint rounded away from zero
pub fn percent_fee(amount: ShareType, percent: Decimal) -> Result<ShareType, ValidationError> {
    Decimal::from(amount)
        .checked_mul(percent)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .map(|fee| fee.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|fee| fee.to_i64())
        .ok_or_else(|| ValidationError::invalid("fee computation overflow"))
}

/// Custom fee of a plain transfer
///
/// `None` when no percent applies, either because the epoch predates custom
/// fees or the asset has no entry in the transfer fee table.
pub fn transfer_custom_fee(
    settings: &SettingsObject,
    epoch: PolicyEpoch,
    amount: Asset,
) -> Result<Option<Asset>, ValidationError> {
    if !epoch.custom_fees {
        return Ok(None);
    }
    match settings.transfer_fee_percent(amount.asset_id) {
        Some(percent) => Ok(Some(Asset::new(
            percent_fee(amount.amount, percent)?,
            amount.asset_id,
        ))),
        None => Ok(None),
    }
}

/// Custom fee of a blind transfer
///
/// The settings default fee, replaced by the blind-table percent of the
/// transferred amount when the epoch is current and the asset has an entry.
pub fn blind_transfer_fee(
    settings: &SettingsObject,
    epoch: PolicyEpoch,
    amount: Asset,
) -> Result<Asset, ValidationError> {
    if epoch.custom_fees {
        if let Some(percent) = settings.blind_transfer_fee_percent(amount.asset_id) {
            return Ok(Asset::new(
                percent_fee(amount.amount, percent)?,
                amount.asset_id,
            ));
        }
    }
    Ok(settings.blind_transfer_default_fee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{AssetOptions, SettingsFee};
    use crate::operations::TransferOperation;
    use crate::types::{AccountId, AssetId, Price};

    fn settings() -> SettingsObject {
        SettingsObject {
            transfer_fees: vec![SettingsFee {
                asset_id: AssetId::new(1),
                percent: Decimal::new(5, 0),
            }],
            blind_transfer_fees: vec![SettingsFee {
                asset_id: AssetId::new(1),
                percent: Decimal::new(15, 1),
            }],
            blind_transfer_default_fee: Asset::new(3, CORE_ASSET),
            edc_transfers_daily_limit: 0,
        }
    }

    #[test]
    fn test_percent_fee_rounds_half_up() {
        assert_eq!(percent_fee(40, Decimal::new(5, 0)).unwrap(), 2);
        // 50 * 1% = 0.5 -> 1
        assert_eq!(percent_fee(50, Decimal::ONE).unwrap(), 1);
        // 49 * 1% = 0.49 -> 0
        assert_eq!(percent_fee(49, Decimal::ONE).unwrap(), 0);
        // 150 * 0.5% = 0.75 -> 1
        assert_eq!(percent_fee(150, Decimal::new(5, 1)).unwrap(), 1);
        assert_eq!(percent_fee(0, Decimal::new(5, 0)).unwrap(), 0);
    }

    #[test]
    fn test_percent_fee_overflow() {
        assert!(percent_fee(i64::MAX, Decimal::new(200, 0)).is_err());
    }

    #[test]
    fn test_transfer_custom_fee_by_epoch() {
        let amount = Asset::new(40, AssetId::new(1));
        assert_eq!(
            transfer_custom_fee(&settings(), PolicyEpoch::CURRENT, amount).unwrap(),
            Some(Asset::new(2, AssetId::new(1)))
        );
        assert_eq!(
            transfer_custom_fee(&settings(), PolicyEpoch::LEGACY, amount).unwrap(),
            None
        );
        let other = Asset::new(40, AssetId::new(2));
        assert_eq!(
            transfer_custom_fee(&settings(), PolicyEpoch::CURRENT, other).unwrap(),
            None
        );
    }

    #[test]
    fn test_blind_transfer_fee_falls_back_to_default() {
        let amount = Asset::new(200, AssetId::new(1));
        assert_eq!(
            blind_transfer_fee(&settings(), PolicyEpoch::CURRENT, amount).unwrap(),
            Asset::new(3, AssetId::new(1))
        );
        assert_eq!(
            blind_transfer_fee(&settings(), PolicyEpoch::LEGACY, amount).unwrap(),
            Asset::new(3, CORE_ASSET)
        );
        let other = Asset::new(200, AssetId::new(2));
        assert_eq!(
            blind_transfer_fee(&settings(), PolicyEpoch::CURRENT, other).unwrap(),
            Asset::new(3, CORE_ASSET)
        );
    }

    #[test]
    fn test_required_fee_converts_through_exchange_rate() {
        let usd = AssetId::new(1);
        let mut options = AssetOptions::new(usd);
        // 1 USD == 3 CORE
        options.core_exchange_rate = Price::new(Asset::new(1, usd), Asset::new(3, CORE_ASSET));
        let asset = AssetObject {
            id: usd,
            symbol: "USD".to_string(),
            precision: 2,
            issuer: AccountId::new(0),
            options,
            market_issued: false,
        };
        let op: Operation = TransferOperation {
            fee: Asset::zero(usd),
            from: AccountId::new(1),
            to: AccountId::new(2),
            amount: Asset::new(1, usd),
            memo: None,
        }
        .into();

        let schedule = FeeSchedule::free().with_fee("transfer", 10);
        assert_eq!(schedule.core_fee(&op), Asset::new(10, CORE_ASSET));
        // 10 CORE / 3 = 3.33 USD -> 4
        assert_eq!(schedule.required_fee(&op, &asset).unwrap(), Asset::new(4, usd));
    }
}
