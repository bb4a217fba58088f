//! Fee policy epoch
//!
//! Transfer fee percentages and the reserve-asset daily volume limit only
//! apply after the fee-policy hard fork. The epoch is resolved once at the
//! start of each evaluation and carried in the evaluation context, so
//! evaluators never compare timestamps themselves.

use crate::config::ChainParameters;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Fee policy in force for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyEpoch {
    /// Percent fees from the settings tables are charged
    pub custom_fees: bool,
    /// Reserve-asset daily volume limit is enforced and counted
    pub daily_limit: bool,
}

impl PolicyEpoch {
    /// Policy before the hard fork
    pub const LEGACY: PolicyEpoch = PolicyEpoch {
        custom_fees: false,
        daily_limit: false,
    };

    /// Policy after the hard fork
    pub const CURRENT: PolicyEpoch = PolicyEpoch {
        custom_fees: true,
        daily_limit: true,
    };

    /// Resolve the epoch for a head block time
    ///
    /// The hard fork takes effect strictly after `fee_policy_hardfork`.
    pub fn resolve(params: &ChainParameters, head_block_time: Timestamp) -> Self {
        if head_block_time > params.fee_policy_hardfork {
            Self::CURRENT
        } else {
            Self::LEGACY
        }
    }
}
