//! Authorization oracle
//!
//! Answers whether a set of signing keys satisfies the authorities an
//! operation requires. Account authorities are followed recursively through
//! the active authority of each referenced account, up to
//! `max_authority_depth` levels.

use crate::error::ValidationError;
use crate::operations::RequiredAuthorities;
use crate::types::{AccountId, Authority, PublicKey};
use std::collections::BTreeSet;

/// Source of account authorities
pub trait AuthorityOracle {
    /// Active authority of an account
    fn active_authority(&self, account: AccountId) -> Option<&Authority>;

    /// Owner authority of an account
    fn owner_authority(&self, account: AccountId) -> Option<&Authority>;

    /// Maximum recursion through account authorities
    fn max_authority_depth(&self) -> u8;
}

/// Whether `keys` satisfy `authority`
pub fn is_authority_satisfied<O: AuthorityOracle + ?Sized>(
    oracle: &O,
    authority: &Authority,
    keys: &BTreeSet<PublicKey>,
) -> bool {
    satisfied_at_depth(oracle, authority, keys, 0)
}

fn satisfied_at_depth<O: AuthorityOracle + ?Sized>(
    oracle: &O,
    authority: &Authority,
    keys: &BTreeSet<PublicKey>,
    depth: u8,
) -> bool {
    let threshold = u64::from(authority.weight_threshold);
    let mut weight: u64 = 0;

    for (key, key_weight) in &authority.key_auths {
        if keys.contains(key) {
            weight += u64::from(*key_weight);
            if weight >= threshold {
                return true;
            }
        }
    }

    if depth < oracle.max_authority_depth() {
        for (account, account_weight) in &authority.account_auths {
            let Some(active) = oracle.active_authority(*account) else {
                continue;
            };
            if satisfied_at_depth(oracle, active, keys, depth + 1) {
                weight += u64::from(*account_weight);
                if weight >= threshold {
                    return true;
                }
            }
        }
    }

    weight >= threshold
}

/// Check every required authority against the signing keys
///
/// An active requirement is also met by the account's owner authority.
pub fn verify_authority<O: AuthorityOracle + ?Sized>(
    oracle: &O,
    required: &RequiredAuthorities,
    keys: &BTreeSet<PublicKey>,
) -> Result<(), ValidationError> {
    for account in &required.active {
        let active = oracle
            .active_authority(*account)
            .ok_or_else(|| ValidationError::not_found(account))?;
        let by_active = is_authority_satisfied(oracle, active, keys);
        let by_owner = || {
            oracle
                .owner_authority(*account)
                .map(|owner| is_authority_satisfied(oracle, owner, keys))
                .unwrap_or(false)
        };
        if !by_active && !by_owner() {
            return Err(ValidationError::MissingAuthority {
                account: account.to_string(),
                level: "active",
            });
        }
    }

    for account in &required.owner {
        let owner = oracle
            .owner_authority(*account)
            .ok_or_else(|| ValidationError::not_found(account))?;
        if !is_authority_satisfied(oracle, owner, keys) {
            return Err(ValidationError::MissingAuthority {
                account: account.to_string(),
                level: "owner",
            });
        }
    }

    for authority in &required.other {
        if !is_authority_satisfied(oracle, authority, keys) {
            return Err(ValidationError::MissingAuthority {
                account: "<key authority>".to_string(),
                level: "other",
            });
        }
    }

    Ok(())
}

/// Keys among `available` that can contribute to the required authorities
pub fn required_signers<O: AuthorityOracle + ?Sized>(
    oracle: &O,
    required: &RequiredAuthorities,
    available: &BTreeSet<PublicKey>,
) -> BTreeSet<PublicKey> {
    let mut signers = BTreeSet::new();
    for account in &required.active {
        if let Some(active) = oracle.active_authority(*account) {
            collect_keys(oracle, active, available, 0, &mut signers);
        }
    }
    for account in &required.owner {
        if let Some(owner) = oracle.owner_authority(*account) {
            collect_keys(oracle, owner, available, 0, &mut signers);
        }
    }
    for authority in &required.other {
        collect_keys(oracle, authority, available, 0, &mut signers);
    }
    signers
}

fn collect_keys<O: AuthorityOracle + ?Sized>(
    oracle: &O,
    authority: &Authority,
    available: &BTreeSet<PublicKey>,
    depth: u8,
    signers: &mut BTreeSet<PublicKey>,
) {
    signers.extend(
        authority
            .key_auths
            .keys()
            .filter(|key| available.contains(*key))
            .cloned(),
    );
    if depth < oracle.max_authority_depth() {
        for account in authority.account_auths.keys() {
            if let Some(active) = oracle.active_authority(*account) {
                collect_keys(oracle, active, available, depth + 1, signers);
            }
        }
    }
}
