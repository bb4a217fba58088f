//! Ledger store
//!
//! [`LedgerStore`] is the object database seen by evaluators: point lookups
//! by id and secondary key, in-place modification through callbacks, object
//! creation and balance adjustment. [`InMemoryStore`] is the reference
//! implementation used by the node and the tests.
//!
//! # Indexes
//!
//! - cheques by code and by drawer
//! - accounts by name
//! - assets by symbol
//! - block summaries by `block_num & 0xffff`

use crate::authority::AuthorityOracle;
use crate::cheque::ChequeObject;
use crate::config::ChainParameters;
use crate::error::{Error, Result, ValidationError};
use crate::fee::FeeSchedule;
use crate::objects::{
    AccountObject, AccountRestriction, AssetDynamicData, AssetObject, BlindTransferObject,
    FundDepositObject, FundObject, SettingsObject,
};
use crate::types::{
    AccountId, Asset, AssetId, Authority, BlindTransferId, BlockId, ChequeId, FundDepositId,
    FundId, ShareType, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Object database used by evaluators
///
/// Read methods never fail; `get_*` helpers turn a missing object into a
/// [`ValidationError::ObjectNotFound`]. Mutations are only called from
/// evaluator `apply` and report missing objects or negative balances as
/// [`Error::InvariantViolation`].
pub trait LedgerStore {
    /// Time of the head block
    fn head_block_time(&self) -> Timestamp;

    /// Number of the head block
    fn head_block_num(&self) -> u32;

    /// Chain parameters
    fn chain_parameters(&self) -> &ChainParameters;

    /// Flat fee schedule
    fn fee_schedule(&self) -> &FeeSchedule;

    /// Global settings singleton
    fn settings(&self) -> &SettingsObject;

    /// Account by id
    fn find_account(&self, id: AccountId) -> Option<&AccountObject>;

    /// Account by name
    fn find_account_by_name(&self, name: &str) -> Option<&AccountObject>;

    /// Asset by id
    fn find_asset(&self, id: AssetId) -> Option<&AssetObject>;

    /// Asset by symbol
    fn find_asset_by_symbol(&self, symbol: &str) -> Option<&AssetObject>;

    /// Supply data of an asset
    fn find_asset_dynamic_data(&self, id: AssetId) -> Option<&AssetDynamicData>;

    /// Cheque by id
    fn find_cheque(&self, id: ChequeId) -> Option<&ChequeObject>;

    /// Cheque by redemption code
    fn find_cheque_by_code(&self, code: &str) -> Option<&ChequeObject>;

    /// Cheques drawn by an account, ordered by id
    fn cheques_by_drawer(&self, drawer: AccountId) -> Vec<&ChequeObject>;

    /// Fund by id
    fn find_fund(&self, id: FundId) -> Option<&FundObject>;

    /// Fund deposit by id
    fn find_fund_deposit(&self, id: FundDepositId) -> Option<&FundDepositObject>;

    /// Committee restriction on an account
    fn find_restriction(&self, account: AccountId) -> Option<&AccountRestriction>;

    /// Block id recorded in a block summary slot
    fn block_summary(&self, slot: u16) -> Option<&BlockId>;

    /// Balance of an account in an asset (zero when absent)
    fn get_balance(&self, account: AccountId, asset: AssetId) -> Asset;

    /// All non-zero balances of an account
    fn balances_of(&self, account: AccountId) -> Vec<Asset>;

    /// Modify an account in place
    fn modify_account<F: FnOnce(&mut AccountObject)>(&mut self, id: AccountId, f: F) -> Result<()>;

    /// Modify asset supply data in place
    fn modify_asset_dynamic_data<F: FnOnce(&mut AssetDynamicData)>(
        &mut self,
        id: AssetId,
        f: F,
    ) -> Result<()>;

    /// Modify the settings singleton in place
    fn modify_settings<F: FnOnce(&mut SettingsObject)>(&mut self, f: F) -> Result<()>;

    /// Modify a cheque in place
    fn modify_cheque<F: FnOnce(&mut ChequeObject)>(&mut self, id: ChequeId, f: F) -> Result<()>;

    /// Modify a fund in place
    fn modify_fund<F: FnOnce(&mut FundObject)>(&mut self, id: FundId, f: F) -> Result<()>;

    /// Insert a cheque, assigning its id
    fn create_cheque(&mut self, cheque: ChequeObject) -> Result<ChequeId>;

    /// Insert a blind transfer record, assigning its id
    fn create_blind_transfer(&mut self, record: BlindTransferObject) -> Result<BlindTransferId>;

    /// Add `delta` (possibly negative) to a balance
    ///
    /// Fails without modifying anything if the balance would go negative.
    fn adjust_balance(&mut self, account: AccountId, delta: Asset) -> Result<()>;

    /// Start recording the prior value of every object later mutations touch
    ///
    /// Sessions do not nest.
    fn begin_undo_session(&mut self) -> Result<()>;

    /// End the session, keeping every change made during it
    fn commit_undo_session(&mut self);

    /// End the session, restoring every object it recorded
    fn undo_session(&mut self);

    /// Account by id, or not found
    fn get_account(&self, id: AccountId) -> Result<&AccountObject> {
        self.find_account(id)
            .ok_or_else(|| ValidationError::not_found(id).into())
    }

    /// Asset by id, or not found
    fn get_asset(&self, id: AssetId) -> Result<&AssetObject> {
        self.find_asset(id)
            .ok_or_else(|| ValidationError::not_found(id).into())
    }

    /// Asset supply data, or not found
    fn get_asset_dynamic_data(&self, id: AssetId) -> Result<&AssetDynamicData> {
        self.find_asset_dynamic_data(id)
            .ok_or_else(|| ValidationError::not_found(format!("{} dynamic data", id)).into())
    }

    /// Cheque by id, or not found
    fn get_cheque(&self, id: ChequeId) -> Result<&ChequeObject> {
        self.find_cheque(id)
            .ok_or_else(|| ValidationError::not_found(id).into())
    }

    /// Fund by id, or not found
    fn get_fund(&self, id: FundId) -> Result<&FundObject> {
        self.find_fund(id)
            .ok_or_else(|| ValidationError::not_found(id).into())
    }
}

fn vanished(id: impl std::fmt::Display) -> Error {
    Error::InvariantViolation(format!("object {} vanished between evaluate and apply", id))
}

/// Prior values recorded by an undo session, first touch only
///
/// `None` marks an object created during the session.
#[derive(Debug, Clone, Default, PartialEq)]
struct UndoState {
    settings: Option<SettingsObject>,
    accounts: BTreeMap<AccountId, Option<AccountObject>>,
    asset_dynamic_data: BTreeMap<AssetId, Option<AssetDynamicData>>,
    balances: BTreeMap<(AccountId, AssetId), Option<ShareType>>,
    cheques: BTreeMap<ChequeId, Option<ChequeObject>>,
    funds: BTreeMap<FundId, Option<FundObject>>,
    blind_transfers: BTreeMap<BlindTransferId, Option<BlindTransferObject>>,
}

fn remember<K: Ord + Copy, V: Clone>(
    journal: &mut BTreeMap<K, Option<V>>,
    live: &BTreeMap<K, V>,
    key: K,
) {
    journal.entry(key).or_insert_with(|| live.get(&key).cloned());
}

fn restore<K: Ord, V>(live: &mut BTreeMap<K, V>, journal: BTreeMap<K, Option<V>>) {
    for (key, prior) in journal {
        match prior {
            Some(value) => {
                live.insert(key, value);
            }
            None => {
                live.remove(&key);
            }
        }
    }
}

/// In-memory object database
///
/// Mutations made through [`LedgerStore`] inside an undo session are
/// journaled per object, so a failed transaction is rolled back in time
/// proportional to what it touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryStore {
    head_block_time: Timestamp,
    head_block_num: u32,
    parameters: ChainParameters,
    fee_schedule: FeeSchedule,
    settings: SettingsObject,

    accounts: BTreeMap<AccountId, AccountObject>,
    assets: BTreeMap<AssetId, AssetObject>,
    asset_dynamic_data: BTreeMap<AssetId, AssetDynamicData>,
    balances: BTreeMap<(AccountId, AssetId), ShareType>,
    cheques: BTreeMap<ChequeId, ChequeObject>,
    funds: BTreeMap<FundId, FundObject>,
    fund_deposits: BTreeMap<FundDepositId, FundDepositObject>,
    blind_transfers: BTreeMap<BlindTransferId, BlindTransferObject>,
    restrictions: BTreeMap<AccountId, AccountRestriction>,
    block_summaries: BTreeMap<u16, BlockId>,

    // Secondary indexes
    accounts_by_name: BTreeMap<String, AccountId>,
    assets_by_symbol: BTreeMap<String, AssetId>,
    cheques_by_code: BTreeMap<String, ChequeId>,
    cheques_by_drawer: BTreeMap<AccountId, BTreeSet<ChequeId>>,

    #[serde(skip)]
    undo: Option<UndoState>,
}

impl InMemoryStore {
    /// Empty store with the given parameters
    pub fn new(parameters: ChainParameters) -> Self {
        Self {
            parameters,
            ..Default::default()
        }
    }

    /// Set the head block time
    pub fn set_head_block_time(&mut self, time: Timestamp) {
        self.head_block_time = time;
    }

    /// Record a new head block and its summary
    pub fn push_block(&mut self, block_num: u32, id: BlockId, time: Timestamp) {
        self.head_block_num = block_num;
        self.head_block_time = time;
        self.block_summaries.insert((block_num & 0xffff) as u16, id);
    }

    /// Replace the chain parameters
    pub fn set_chain_parameters(&mut self, parameters: ChainParameters) {
        self.parameters = parameters;
    }

    /// Replace the fee schedule
    pub fn set_fee_schedule(&mut self, schedule: FeeSchedule) {
        self.fee_schedule = schedule;
    }

    /// Replace the settings singleton
    pub fn set_settings(&mut self, settings: SettingsObject) {
        self.settings = settings;
    }

    /// Insert or replace an account
    pub fn insert_account(&mut self, account: AccountObject) {
        self.accounts_by_name.insert(account.name.clone(), account.id);
        self.accounts.insert(account.id, account);
    }

    /// Create an account with a single-key authority, assigning the next id
    pub fn create_account(&mut self, name: &str, key: crate::types::PublicKey) -> AccountId {
        let id = AccountId::new(next_instance(&self.accounts));
        let authority = Authority::from_key(key);
        self.insert_account(AccountObject {
            id,
            name: name.to_string(),
            owner: authority.clone(),
            active: authority,
            ..Default::default()
        });
        id
    }

    /// Insert or replace an asset, with the given circulating supply
    pub fn insert_asset(&mut self, asset: AssetObject, current_supply: ShareType) {
        self.asset_dynamic_data.insert(
            asset.id,
            AssetDynamicData {
                asset_id: asset.id,
                current_supply,
                accumulated_fees: 0,
            },
        );
        self.assets_by_symbol.insert(asset.symbol.clone(), asset.id);
        self.assets.insert(asset.id, asset);
    }

    /// Issue `amount` to an account, raising supply by the same amount
    pub fn issue(&mut self, account: AccountId, amount: Asset) -> Result<()> {
        self.adjust_balance(account, amount)?;
        self.modify_asset_dynamic_data(amount.asset_id, |data| {
            data.current_supply += amount.amount;
        })
    }

    /// Insert or replace a fund
    pub fn insert_fund(&mut self, fund: FundObject) {
        self.funds.insert(fund.id, fund);
    }

    /// Insert or replace a fund deposit
    pub fn insert_fund_deposit(&mut self, deposit: FundDepositObject) {
        self.fund_deposits.insert(deposit.id, deposit);
    }

    /// Restrict an account, replacing any earlier restriction
    pub fn set_restriction(&mut self, restriction: AccountRestriction) {
        self.restrictions.insert(restriction.account, restriction);
    }

    /// Lift a restriction
    pub fn clear_restriction(&mut self, account: AccountId) {
        self.restrictions.remove(&account);
    }

    /// Blind transfer record by id
    pub fn find_blind_transfer(&self, id: BlindTransferId) -> Option<&BlindTransferObject> {
        self.blind_transfers.get(&id)
    }

    /// All assets, ordered by id
    pub fn assets(&self) -> impl Iterator<Item = &AssetObject> {
        self.assets.values()
    }

    /// Sum of all balances held in an asset
    pub fn total_balance(&self, asset: AssetId) -> ShareType {
        self.balances
            .iter()
            .filter(|((_, id), _)| *id == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }

    /// Whether an undo session is open
    pub fn in_undo_session(&self) -> bool {
        self.undo.is_some()
    }

    fn unindex_account(&mut self, id: AccountId) {
        if let Some(account) = self.accounts.get(&id) {
            self.accounts_by_name.remove(&account.name);
        }
    }

    fn unindex_cheque(&mut self, id: ChequeId) {
        if let Some(cheque) = self.cheques.get(&id) {
            self.cheques_by_code.remove(&cheque.code);
            if let Some(ids) = self.cheques_by_drawer.get_mut(&cheque.drawer) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.cheques_by_drawer.remove(&cheque.drawer);
                }
            }
        }
    }

    fn index_cheque(&mut self, id: ChequeId) {
        if let Some(cheque) = self.cheques.get(&id) {
            self.cheques_by_code.insert(cheque.code.clone(), id);
            self.cheques_by_drawer
                .entry(cheque.drawer)
                .or_default()
                .insert(id);
        }
    }

    /// Write the store to a snapshot file
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::info!(
            path = %path.as_ref().display(),
            head_block_num = self.head_block_num,
            accounts = self.accounts.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Read a store from a snapshot file
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let store: InMemoryStore = bincode::deserialize(&bytes)?;
        tracing::info!(
            path = %path.as_ref().display(),
            head_block_num = store.head_block_num,
            "Snapshot loaded"
        );
        Ok(store)
    }
}

fn next_instance<K: Copy + Into<crate::types::ObjectId>, V>(map: &BTreeMap<K, V>) -> u64 {
    map.keys()
        .next_back()
        .map(|id| (*id).into().instance + 1)
        .unwrap_or(0)
}

impl LedgerStore for InMemoryStore {
    fn head_block_time(&self) -> Timestamp {
        self.head_block_time
    }

    fn head_block_num(&self) -> u32 {
        self.head_block_num
    }

    fn chain_parameters(&self) -> &ChainParameters {
        &self.parameters
    }

    fn fee_schedule(&self) -> &FeeSchedule {
        &self.fee_schedule
    }

    fn settings(&self) -> &SettingsObject {
        &self.settings
    }

    fn find_account(&self, id: AccountId) -> Option<&AccountObject> {
        self.accounts.get(&id)
    }

    fn find_account_by_name(&self, name: &str) -> Option<&AccountObject> {
        self.accounts_by_name
            .get(name)
            .and_then(|id| self.accounts.get(id))
    }

    fn find_asset(&self, id: AssetId) -> Option<&AssetObject> {
        self.assets.get(&id)
    }

    fn find_asset_by_symbol(&self, symbol: &str) -> Option<&AssetObject> {
        self.assets_by_symbol
            .get(symbol)
            .and_then(|id| self.assets.get(id))
    }

    fn find_asset_dynamic_data(&self, id: AssetId) -> Option<&AssetDynamicData> {
        self.asset_dynamic_data.get(&id)
    }

    fn find_cheque(&self, id: ChequeId) -> Option<&ChequeObject> {
        self.cheques.get(&id)
    }

    fn find_cheque_by_code(&self, code: &str) -> Option<&ChequeObject> {
        self.cheques_by_code
            .get(code)
            .and_then(|id| self.cheques.get(id))
    }

    fn cheques_by_drawer(&self, drawer: AccountId) -> Vec<&ChequeObject> {
        self.cheques_by_drawer
            .get(&drawer)
            .map(|ids| ids.iter().filter_map(|id| self.cheques.get(id)).collect())
            .unwrap_or_default()
    }

    fn find_fund(&self, id: FundId) -> Option<&FundObject> {
        self.funds.get(&id)
    }

    fn find_fund_deposit(&self, id: FundDepositId) -> Option<&FundDepositObject> {
        self.fund_deposits.get(&id)
    }

    fn find_restriction(&self, account: AccountId) -> Option<&AccountRestriction> {
        self.restrictions.get(&account)
    }

    fn block_summary(&self, slot: u16) -> Option<&BlockId> {
        self.block_summaries.get(&slot)
    }

    fn get_balance(&self, account: AccountId, asset: AssetId) -> Asset {
        let amount = self.balances.get(&(account, asset)).copied().unwrap_or(0);
        Asset::new(amount, asset)
    }

    fn balances_of(&self, account: AccountId) -> Vec<Asset> {
        self.balances
            .range((account, AssetId::new(0))..=(account, AssetId::new(u64::MAX)))
            .map(|((_, asset), amount)| Asset::new(*amount, *asset))
            .collect()
    }

    fn modify_account<F: FnOnce(&mut AccountObject)>(&mut self, id: AccountId, f: F) -> Result<()> {
        if let Some(undo) = &mut self.undo {
            remember(&mut undo.accounts, &self.accounts, id);
        }
        let account = self.accounts.get_mut(&id).ok_or_else(|| vanished(id))?;
        let name = account.name.clone();
        f(account);
        if account.name != name {
            let renamed = account.name.clone();
            self.accounts_by_name.remove(&name);
            self.accounts_by_name.insert(renamed, id);
        }
        Ok(())
    }

    fn modify_asset_dynamic_data<F: FnOnce(&mut AssetDynamicData)>(
        &mut self,
        id: AssetId,
        f: F,
    ) -> Result<()> {
        if let Some(undo) = &mut self.undo {
            remember(&mut undo.asset_dynamic_data, &self.asset_dynamic_data, id);
        }
        let data = self
            .asset_dynamic_data
            .get_mut(&id)
            .ok_or_else(|| vanished(id))?;
        f(data);
        if data.current_supply < 0 {
            return Err(Error::InvariantViolation(format!(
                "supply of {} would become negative ({})",
                id, data.current_supply
            )));
        }
        Ok(())
    }

    fn modify_settings<F: FnOnce(&mut SettingsObject)>(&mut self, f: F) -> Result<()> {
        if let Some(undo) = &mut self.undo {
            undo.settings.get_or_insert_with(|| self.settings.clone());
        }
        f(&mut self.settings);
        Ok(())
    }

    fn modify_cheque<F: FnOnce(&mut ChequeObject)>(&mut self, id: ChequeId, f: F) -> Result<()> {
        if let Some(undo) = &mut self.undo {
            remember(&mut undo.cheques, &self.cheques, id);
        }
        if !self.cheques.contains_key(&id) {
            return Err(vanished(id));
        }
        self.unindex_cheque(id);
        if let Some(cheque) = self.cheques.get_mut(&id) {
            f(cheque);
        }
        self.index_cheque(id);
        Ok(())
    }

    fn modify_fund<F: FnOnce(&mut FundObject)>(&mut self, id: FundId, f: F) -> Result<()> {
        if let Some(undo) = &mut self.undo {
            remember(&mut undo.funds, &self.funds, id);
        }
        let fund = self.funds.get_mut(&id).ok_or_else(|| vanished(id))?;
        f(fund);
        Ok(())
    }

    fn create_cheque(&mut self, mut cheque: ChequeObject) -> Result<ChequeId> {
        if self.cheques_by_code.contains_key(&cheque.code) {
            return Err(Error::InvariantViolation(format!(
                "cheque code {} already exists",
                cheque.code
            )));
        }
        let id = ChequeId::new(next_instance(&self.cheques));
        if let Some(undo) = &mut self.undo {
            remember(&mut undo.cheques, &self.cheques, id);
        }
        cheque.id = id;
        self.cheques.insert(id, cheque);
        self.index_cheque(id);
        Ok(id)
    }

    fn create_blind_transfer(&mut self, mut record: BlindTransferObject) -> Result<BlindTransferId> {
        let id = BlindTransferId::new(next_instance(&self.blind_transfers));
        if let Some(undo) = &mut self.undo {
            remember(&mut undo.blind_transfers, &self.blind_transfers, id);
        }
        record.id = id;
        self.blind_transfers.insert(id, record);
        Ok(id)
    }

    fn adjust_balance(&mut self, account: AccountId, delta: Asset) -> Result<()> {
        let key = (account, delta.asset_id);
        let current = self.balances.get(&key).copied().unwrap_or(0);
        let updated = current.checked_add(delta.amount).ok_or_else(|| {
            Error::InvariantViolation(format!("balance of {} overflows", account))
        })?;
        if updated < 0 {
            return Err(Error::InvariantViolation(format!(
                "balance of {} in {} would become negative ({} + {})",
                account, delta.asset_id, current, delta.amount
            )));
        }
        if let Some(undo) = &mut self.undo {
            remember(&mut undo.balances, &self.balances, key);
        }
        if updated == 0 {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, updated);
        }
        Ok(())
    }

    fn begin_undo_session(&mut self) -> Result<()> {
        if self.undo.is_some() {
            return Err(Error::InvariantViolation(
                "undo session already open".to_string(),
            ));
        }
        self.undo = Some(UndoState::default());
        Ok(())
    }

    fn commit_undo_session(&mut self) {
        self.undo = None;
    }

    fn undo_session(&mut self) {
        let Some(undo) = self.undo.take() else {
            return;
        };
        if let Some(settings) = undo.settings {
            self.settings = settings;
        }

        for id in undo.accounts.keys() {
            self.unindex_account(*id);
        }
        let accounts: Vec<AccountId> = undo.accounts.keys().copied().collect();
        restore(&mut self.accounts, undo.accounts);
        for id in accounts {
            if let Some(account) = self.accounts.get(&id) {
                self.accounts_by_name.insert(account.name.clone(), id);
            }
        }

        for id in undo.cheques.keys() {
            self.unindex_cheque(*id);
        }
        let cheques: Vec<ChequeId> = undo.cheques.keys().copied().collect();
        restore(&mut self.cheques, undo.cheques);
        for id in cheques {
            self.index_cheque(id);
        }

        restore(&mut self.asset_dynamic_data, undo.asset_dynamic_data);
        restore(&mut self.balances, undo.balances);
        restore(&mut self.funds, undo.funds);
        restore(&mut self.blind_transfers, undo.blind_transfers);
        tracing::debug!("Undo session rolled back");
    }
}

impl AuthorityOracle for InMemoryStore {
    fn active_authority(&self, account: AccountId) -> Option<&Authority> {
        self.accounts.get(&account).map(|a| &a.active)
    }

    fn owner_authority(&self, account: AccountId) -> Option<&Authority> {
        self.accounts.get(&account).map(|a| &a.owner)
    }

    fn max_authority_depth(&self) -> u8 {
        self.parameters.max_authority_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::AssetOptions;
    use crate::types::PublicKey;

    fn store() -> (InMemoryStore, AccountId, AssetId) {
        let mut store = InMemoryStore::default();
        let alice = store.create_account("alice", PublicKey::new("alice-key"));
        let usd = AssetId::new(1);
        store.insert_asset(
            AssetObject {
                id: usd,
                symbol: "USD".to_string(),
                precision: 2,
                issuer: AccountId::new(0),
                options: AssetOptions::new(usd),
                market_issued: false,
            },
            0,
        );
        (store, alice, usd)
    }

    #[test]
    fn test_adjust_balance_rejects_negative() {
        let (mut store, alice, usd) = store();
        store.issue(alice, Asset::new(100, usd)).unwrap();
        assert_eq!(store.get_balance(alice, usd), Asset::new(100, usd));

        let err = store.adjust_balance(alice, Asset::new(-101, usd)).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert_eq!(store.get_balance(alice, usd).amount, 100);

        store.adjust_balance(alice, Asset::new(-100, usd)).unwrap();
        assert!(store.balances_of(alice).is_empty());
    }

    #[test]
    fn test_secondary_indexes() {
        let (mut store, alice, usd) = store();
        assert_eq!(store.find_account_by_name("alice").map(|a| a.id), Some(alice));
        assert_eq!(store.find_asset_by_symbol("USD").map(|a| a.id), Some(usd));

        let id = store
            .create_cheque(ChequeObject {
                code: "ABCDEFGH12345678".to_string(),
                drawer: alice,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.find_cheque_by_code("ABCDEFGH12345678").map(|c| c.id), Some(id));
        assert_eq!(store.cheques_by_drawer(alice).len(), 1);

        // duplicate codes are refused
        assert!(store
            .create_cheque(ChequeObject {
                code: "ABCDEFGH12345678".to_string(),
                ..Default::default()
            })
            .is_err());
    }

    #[test]
    fn test_get_missing_is_validation_error() {
        let (store, _, _) = store();
        let err = store.get_account(AccountId::new(99)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_supply_cannot_go_negative() {
        let (mut store, _, usd) = store();
        let err = store
            .modify_asset_dynamic_data(usd, |data| data.current_supply -= 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut store, alice, usd) = store();
        store.issue(alice, Asset::new(42, usd)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");
        store.save_snapshot(&path).unwrap();

        let loaded = InMemoryStore::load_snapshot(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.get_balance(alice, usd).amount, 42);
    }

    #[test]
    fn test_undo_session_restores_touched_objects() {
        let (mut store, alice, usd) = store();
        store.issue(alice, Asset::new(50, usd)).unwrap();
        let before = store.clone();

        store.begin_undo_session().unwrap();
        assert!(store.in_undo_session());
        store.adjust_balance(alice, Asset::new(-50, usd)).unwrap();
        store
            .modify_account(alice, |a| a.burning_mode_enabled = true)
            .unwrap();
        store
            .modify_asset_dynamic_data(usd, |data| data.accumulated_fees += 7)
            .unwrap();
        store
            .modify_settings(|settings| settings.edc_transfers_daily_limit = 9)
            .unwrap();
        let cheque = store
            .create_cheque(ChequeObject {
                code: "ABCDEFGH12345678".to_string(),
                drawer: alice,
                ..Default::default()
            })
            .unwrap();
        store
            .create_blind_transfer(BlindTransferObject::default())
            .unwrap();
        // a second touch must not overwrite the recorded prior value
        store.adjust_balance(alice, Asset::new(5, usd)).unwrap();

        store.undo_session();
        assert!(!store.in_undo_session());
        assert_eq!(store, before);
        assert!(store.find_cheque(cheque).is_none());
        assert!(store.find_cheque_by_code("ABCDEFGH12345678").is_none());
        assert!(store.cheques_by_drawer(alice).is_empty());
        assert!(store.find_blind_transfer(BlindTransferId::new(0)).is_none());
    }

    #[test]
    fn test_undo_session_restores_failed_supply_change() {
        let (mut store, _, usd) = store();
        let before = store.clone();

        store.begin_undo_session().unwrap();
        assert!(store
            .modify_asset_dynamic_data(usd, |data| data.current_supply -= 1)
            .is_err());
        store.undo_session();
        assert_eq!(store, before);
    }

    #[test]
    fn test_committed_session_keeps_changes() {
        let (mut store, alice, usd) = store();
        store.begin_undo_session().unwrap();
        assert!(store.begin_undo_session().is_err());
        store.adjust_balance(alice, Asset::new(5, usd)).unwrap();
        store.commit_undo_session();

        assert_eq!(store.get_balance(alice, usd).amount, 5);
        // nothing left to roll back
        store.undo_session();
        assert_eq!(store.get_balance(alice, usd).amount, 5);
    }

    #[test]
    fn test_authority_oracle() {
        let (store, alice, _) = store();
        assert_eq!(
            store.active_authority(alice),
            Some(&Authority::from_key(PublicKey::new("alice-key")))
        );
        assert_eq!(store.max_authority_depth(), 2);
    }
}
