//! Core types for the chain
//!
//! All types are designed for:
//! - Deterministic serialization (object ids render as `space.type.instance`)
//! - Memory safety (no unsafe code)
//! - Exact integer arithmetic for share amounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// Share amount in the smallest unit of an asset
pub type ShareType = i64;

/// Chain timestamp
pub type Timestamp = DateTime<Utc>;

/// Protocol object space
pub const PROTOCOL_SPACE: u8 = 1;

/// Generic object id `space.type.instance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    /// Object space
    pub space: u8,
    /// Object type within the space
    pub type_id: u8,
    /// Instance number
    pub instance: u64,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.type_id, self.instance)
    }
}

impl FromStr for ObjectId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut next = |what: &str| {
            parts
                .next()
                .ok_or_else(|| format!("object id '{}' is missing its {}", s, what))
        };
        let space = next("space")?
            .parse::<u8>()
            .map_err(|e| format!("invalid object id '{}': {}", s, e))?;
        let type_id = next("type")?
            .parse::<u8>()
            .map_err(|e| format!("invalid object id '{}': {}", s, e))?;
        let instance = next("instance")?
            .parse::<u64>()
            .map_err(|e| format!("invalid object id '{}': {}", s, e))?;
        if parts.next().is_some() {
            return Err(format!("invalid object id '{}': too many components", s));
        }
        Ok(Self {
            space,
            type_id,
            instance,
        })
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

macro_rules! object_id_type {
    ($(#[$meta:meta])* $name:ident, $type_id:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(u64);

        impl $name {
            /// Object type within the protocol space
            pub const TYPE_ID: u8 = $type_id;

            /// Create from instance number
            pub const fn new(instance: u64) -> Self {
                Self(instance)
            }

            /// Instance number
            pub fn instance(&self) -> u64 {
                self.0
            }
        }

        impl From<$name> for ObjectId {
            fn from(id: $name) -> ObjectId {
                ObjectId {
                    space: PROTOCOL_SPACE,
                    type_id: $type_id,
                    instance: id.0,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", ObjectId::from(*self))
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let id: ObjectId = s.parse()?;
                if id.space != PROTOCOL_SPACE || id.type_id != $type_id {
                    return Err(format!(
                        "'{}' is not a {} id",
                        s,
                        stringify!($name)
                    ));
                }
                Ok(Self(id.instance))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

object_id_type!(
    /// Account id (`1.2.N`)
    AccountId, 2
);
object_id_type!(
    /// Asset id (`1.3.N`)
    AssetId, 3
);
object_id_type!(
    /// Force settlement id
    ForceSettlementId, 4
);
object_id_type!(
    /// Committee member id
    CommitteeMemberId, 5
);
object_id_type!(
    /// Witness id
    WitnessId, 6
);
object_id_type!(
    /// Limit order id
    LimitOrderId, 7
);
object_id_type!(
    /// Proposal id
    ProposalId, 10
);
object_id_type!(
    /// Withdraw permission id
    WithdrawPermissionId, 12
);
object_id_type!(
    /// Vesting balance id
    VestingBalanceId, 13
);
object_id_type!(
    /// Genesis balance id
    BalanceId, 15
);
object_id_type!(
    /// Fund id
    FundId, 16
);
object_id_type!(
    /// Fund deposit id
    FundDepositId, 17
);
object_id_type!(
    /// Cheque id
    ChequeId, 18
);
object_id_type!(
    /// Blind transfer record id
    BlindTransferId, 19
);

/// The core asset, id `1.3.0`
pub const CORE_ASSET: AssetId = AssetId::new(0);

/// The committee account, id `1.2.0`
pub const COMMITTEE_ACCOUNT: AccountId = AccountId::new(0);

/// Fund administration account, id `1.2.1`
pub const ALPHA_ACCOUNT: AccountId = AccountId::new(1);

/// Placeholder fee payer for blind-balance operations, id `1.2.4`
pub const TEMP_ACCOUNT: AccountId = AccountId::new(4);

/// An amount of a specific asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Asset {
    /// Amount in the smallest unit
    pub amount: ShareType,
    /// Asset id
    pub asset_id: AssetId,
}

impl Asset {
    /// Create new asset amount
    pub const fn new(amount: ShareType, asset_id: AssetId) -> Self {
        Self { amount, asset_id }
    }

    /// Zero of the given asset
    pub const fn zero(asset_id: AssetId) -> Self {
        Self::new(0, asset_id)
    }
}

impl Neg for Asset {
    type Output = Asset;

    fn neg(self) -> Asset {
        Asset::new(-self.amount, self.asset_id)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset_id)
    }
}

/// Exchange rate between two assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Base side
    pub base: Asset,
    /// Quote side
    pub quote: Asset,
}

impl Price {
    /// Create new price
    pub fn new(base: Asset, quote: Asset) -> Self {
        Self { base, quote }
    }

    /// 1:1 price between an asset and the core asset
    pub fn unit(asset_id: AssetId) -> Self {
        Self::new(Asset::new(1, asset_id), Asset::new(1, CORE_ASSET))
    }

    /// Convert `amount` to the other side of the price, rounding up
    ///
    /// Returns `None` if `amount` is in neither asset of the price, a side of
    /// the price is zero, or the result does not fit a share amount.
    pub fn convert_round_up(&self, amount: Asset) -> Option<Asset> {
        let (from, to) = if amount.asset_id == self.base.asset_id {
            (self.base, self.quote)
        } else if amount.asset_id == self.quote.asset_id {
            (self.quote, self.base)
        } else {
            return None;
        };

        if from.amount <= 0 || to.amount <= 0 {
            return None;
        }

        let numerator = i128::from(amount.amount) * i128::from(to.amount);
        let denominator = i128::from(from.amount);
        let mut result = numerator / denominator;
        if numerator % denominator != 0 {
            result += 1;
        }

        ShareType::try_from(result)
            .ok()
            .map(|value| Asset::new(value, to.asset_id))
    }
}

/// Public key, carried as its textual encoding
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(String);

impl PublicKey {
    /// Create from textual encoding
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weighted multi-signature authority
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Authority {
    /// Sum of weights required
    pub weight_threshold: u32,
    /// Weighted account authorities
    pub account_auths: BTreeMap<AccountId, u16>,
    /// Weighted key authorities
    pub key_auths: BTreeMap<PublicKey, u16>,
}

impl Authority {
    /// Authority satisfied by a single key
    pub fn from_key(key: PublicKey) -> Self {
        let mut key_auths = BTreeMap::new();
        key_auths.insert(key, 1);
        Self {
            weight_threshold: 1,
            account_auths: BTreeMap::new(),
            key_auths,
        }
    }

    /// Authority satisfied by a single account
    pub fn from_account(account: AccountId) -> Self {
        let mut account_auths = BTreeMap::new();
        account_auths.insert(account, 1);
        Self {
            weight_threshold: 1,
            account_auths,
            key_auths: BTreeMap::new(),
        }
    }

    /// Authority that can never be satisfied
    pub fn is_impossible(&self) -> bool {
        let total: u64 = self
            .account_auths
            .values()
            .chain(self.key_auths.values())
            .map(|w| u64::from(*w))
            .sum();
        total < u64::from(self.weight_threshold)
    }
}

/// Collect every account named in an authority
pub fn add_authority_accounts(result: &mut BTreeSet<AccountId>, authority: &Authority) {
    result.extend(authority.account_auths.keys().copied());
}

/// Block id (hex-encoded hash)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub String);

impl BlockId {
    /// Block number encoded in the first four bytes of the id
    pub fn block_num(&self) -> Option<u32> {
        let prefix = self.0.get(..8)?;
        u32::from_str_radix(prefix, 16).ok()
    }
}
