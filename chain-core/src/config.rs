//! Configuration for the chain node

use crate::genesis::GenesisConfig;
use crate::types::{AssetId, Timestamp};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Consensus-relevant chain parameters
    pub chain: ChainParameters,

    /// Chain actor configuration
    pub actor: ActorConfig,

    /// Initial chain state
    pub genesis: GenesisConfig,

    /// Snapshot file loaded on start and written on shutdown
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "chain-node".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            chain: ChainParameters::default(),
            actor: ActorConfig::default(),
            genesis: GenesisConfig::default(),
            snapshot_path: None,
        }
    }
}

/// Chain parameters read by evaluators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainParameters {
    /// Percent fees and the daily limit apply strictly after this time
    pub fee_policy_hardfork: Timestamp,

    /// Asset subject to the daily volume limit
    pub reserve_asset: AssetId,

    /// Maximum recursion through account authorities
    pub max_authority_depth: u8,

    /// Assert predicates must have an opcode below this value
    pub max_predicate_opcode: u8,

    /// Node skips assert predicate evaluation
    pub skip_assert_evaluation: bool,

    /// Reject transactions that carry no signing keys
    pub require_signatures: bool,
}

impl Default for ChainParameters {
    fn default() -> Self {
        Self {
            fee_policy_hardfork: Utc
                .timestamp_opt(1_546_300_800, 0) // 2019-01-01T00:00:00Z
                .single()
                .unwrap_or_default(),
            reserve_asset: AssetId::new(1),
            max_authority_depth: 2,
            max_predicate_opcode: 3,
            skip_assert_evaluation: false,
            require_signatures: false,
        }
    }
}

/// Chain actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Mailbox capacity (messages)
    pub mailbox_capacity: usize,

    /// Applied-operation notification buffer (operations)
    pub notification_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1_000,
            notification_capacity: 4_096,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(path) = std::env::var("CHAIN_SNAPSHOT_PATH") {
            config.snapshot_path = Some(PathBuf::from(path));
        }

        if let Ok(value) = std::env::var("CHAIN_FEE_POLICY_HARDFORK") {
            config.chain.fee_policy_hardfork = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_FEE_POLICY_HARDFORK: {}", e)))?;
        }

        if let Ok(value) = std::env::var("CHAIN_RESERVE_ASSET") {
            config.chain.reserve_asset = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_RESERVE_ASSET: {}", e)))?;
        }

        if let Ok(value) = std::env::var("CHAIN_MAILBOX_CAPACITY") {
            config.actor.mailbox_capacity = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_MAILBOX_CAPACITY: {}", e)))?;
        }

        if let Ok(value) = std::env::var("CHAIN_SKIP_ASSERT_EVALUATION") {
            config.chain.skip_assert_evaluation = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_SKIP_ASSERT_EVALUATION: {}", e)))?;
        }

        if let Ok(value) = std::env::var("CHAIN_REQUIRE_SIGNATURES") {
            config.chain.require_signatures = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_REQUIRE_SIGNATURES: {}", e)))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "chain-node");
        assert_eq!(config.chain.max_authority_depth, 2);
        assert_eq!(config.chain.reserve_asset, AssetId::new(1));
        assert!(config.snapshot_path.is_none());
        assert!(!config.chain.require_signatures);
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
service_name = "edc-test"

[chain]
fee_policy_hardfork = "2020-06-01T00:00:00Z"
reserve_asset = "1.3.2"
skip_assert_evaluation = true
require_signatures = true
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.service_name, "edc-test");
        assert_eq!(config.chain.reserve_asset, AssetId::new(2));
        assert!(config.chain.skip_assert_evaluation);
        assert!(config.chain.require_signatures);
        assert_eq!(
            config.chain.fee_policy_hardfork,
            Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap()
        );
        // untouched sections keep their defaults
        assert_eq!(config.actor.mailbox_capacity, 1_000);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chain = 5").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
