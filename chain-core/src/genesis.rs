//! Genesis state
//!
//! Builds the initial [`InMemoryStore`] from configuration. Accounts and
//! assets are created in declaration order, so the first account is
//! `1.2.0` (the committee) and the first asset is `1.3.0` (the core asset).

use crate::config::ChainParameters;
use crate::error::{Error, Result};
use crate::fee::FeeSchedule;
use crate::objects::{AssetObject, AssetOptions, SettingsObject};
use crate::store::{InMemoryStore, LedgerStore};
use crate::types::{AssetId, PublicKey, ShareType, Timestamp, COMMITTEE_ACCOUNT};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Account created at genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    /// Account name
    pub name: String,
    /// Owner and active key
    pub key: PublicKey,
}

/// Asset created at genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAsset {
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places
    pub precision: u8,
    /// Name of the issuing account
    pub issuer: String,
    /// Flag bits
    #[serde(default)]
    pub flags: u16,
    /// Collateral backed
    #[serde(default)]
    pub market_issued: bool,
}

/// Balance issued at genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    /// Account name
    pub owner: String,
    /// Asset symbol
    pub asset: String,
    /// Amount issued
    pub amount: ShareType,
}

/// Initial chain state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Head block time of the empty chain
    pub initial_timestamp: Timestamp,
    /// Accounts, in id order
    pub accounts: Vec<GenesisAccount>,
    /// Assets, in id order
    pub assets: Vec<GenesisAsset>,
    /// Initial balances
    pub balances: Vec<GenesisBalance>,
    /// Flat fee schedule
    pub fee_schedule: FeeSchedule,
    /// Settings singleton
    pub settings: SettingsObject,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            initial_timestamp: Utc
                .timestamp_opt(1_514_764_800, 0) // 2018-01-01T00:00:00Z
                .single()
                .unwrap_or_default(),
            accounts: vec![GenesisAccount {
                name: "committee-account".to_string(),
                key: PublicKey::new("EDC-committee"),
            }],
            assets: vec![
                GenesisAsset {
                    symbol: "CORE".to_string(),
                    precision: 5,
                    issuer: "committee-account".to_string(),
                    flags: 0,
                    market_issued: false,
                },
                GenesisAsset {
                    symbol: "EDC".to_string(),
                    precision: 3,
                    issuer: "committee-account".to_string(),
                    flags: 0,
                    market_issued: false,
                },
            ],
            balances: Vec::new(),
            fee_schedule: FeeSchedule::free(),
            settings: SettingsObject::default(),
        }
    }
}

impl GenesisConfig {
    /// Build the initial store
    pub fn build_store(&self, parameters: ChainParameters) -> Result<InMemoryStore> {
        let mut store = InMemoryStore::new(parameters);
        store.set_head_block_time(self.initial_timestamp);
        store.set_fee_schedule(self.fee_schedule.clone());

        for account in &self.accounts {
            if store.find_account_by_name(&account.name).is_some() {
                return Err(Error::Config(format!(
                    "duplicate genesis account '{}'",
                    account.name
                )));
            }
            store.create_account(&account.name, account.key.clone());
        }
        if store.find_account(COMMITTEE_ACCOUNT).is_none() {
            return Err(Error::Config("genesis has no committee account".to_string()));
        }

        for (instance, asset) in self.assets.iter().enumerate() {
            let issuer = store
                .find_account_by_name(&asset.issuer)
                .map(|account| account.id)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "asset {} issued by unknown account '{}'",
                        asset.symbol, asset.issuer
                    ))
                })?;
            if store.find_asset_by_symbol(&asset.symbol).is_some() {
                return Err(Error::Config(format!(
                    "duplicate genesis asset '{}'",
                    asset.symbol
                )));
            }
            let id = AssetId::new(instance as u64);
            let mut options = AssetOptions::new(id);
            options.flags = asset.flags;
            store.insert_asset(
                AssetObject {
                    id,
                    symbol: asset.symbol.clone(),
                    precision: asset.precision,
                    issuer,
                    options,
                    market_issued: asset.market_issued,
                },
                0,
            );
        }

        for balance in &self.balances {
            let owner = store
                .find_account_by_name(&balance.owner)
                .map(|account| account.id)
                .ok_or_else(|| {
                    Error::Config(format!("balance for unknown account '{}'", balance.owner))
                })?;
            let asset = store
                .find_asset_by_symbol(&balance.asset)
                .map(|asset| asset.amount(balance.amount))
                .ok_or_else(|| {
                    Error::Config(format!("balance in unknown asset '{}'", balance.asset))
                })?;
            store.issue(owner, asset)?;
        }

        store.set_settings(self.settings.clone());

        tracing::info!(
            accounts = self.accounts.len(),
            assets = self.assets.len(),
            balances = self.balances.len(),
            "Genesis state built"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_genesis_has_core_and_reserve() {
        let params = ChainParameters::default();
        let store = GenesisConfig::default().build_store(params.clone()).unwrap();
        assert_eq!(store.get_asset(AssetId::new(0)).unwrap().symbol, "CORE");
        assert_eq!(store.get_asset(params.reserve_asset).unwrap().symbol, "EDC");
        assert_eq!(
            store.get_account(COMMITTEE_ACCOUNT).unwrap().name,
            "committee-account"
        );
    }

    #[test]
    fn test_balances_are_issued() {
        let mut genesis = GenesisConfig::default();
        genesis.accounts.push(GenesisAccount {
            name: "alice".to_string(),
            key: PublicKey::new("alice-key"),
        });
        genesis.balances.push(GenesisBalance {
            owner: "alice".to_string(),
            asset: "EDC".to_string(),
            amount: 1_000,
        });

        let store = genesis.build_store(ChainParameters::default()).unwrap();
        let alice = store.find_account_by_name("alice").unwrap().id;
        assert_eq!(store.get_balance(alice, AssetId::new(1)).amount, 1_000);
        assert_eq!(
            store.get_asset_dynamic_data(AssetId::new(1)).unwrap().current_supply,
            1_000
        );
    }

    #[test]
    fn test_unknown_names_are_config_errors() {
        let mut genesis = GenesisConfig::default();
        genesis.balances.push(GenesisBalance {
            owner: "nobody".to_string(),
            asset: "EDC".to_string(),
            amount: 1,
        });
        let err = genesis.build_store(ChainParameters::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
