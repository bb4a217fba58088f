//! Configuration for the query layer

use serde::{Deserialize, Serialize};

/// Query layer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Operations kept per account in the history index
    pub history_limit: usize,

    /// Maximum proposal nesting walked by `get_required_fees`
    pub max_fee_recursion: u32,

    /// Largest page returned by list queries
    pub max_page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            max_fee_recursion: 4,
            max_page_size: 100,
        }
    }
}

impl ApiConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ApiConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = ApiConfig::default();

        if let Ok(value) = std::env::var("CHAIN_API_HISTORY_LIMIT") {
            config.history_limit = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_API_HISTORY_LIMIT: {}", e)))?;
        }

        if let Ok(value) = std::env::var("CHAIN_API_MAX_FEE_RECURSION") {
            config.max_fee_recursion = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_API_MAX_FEE_RECURSION: {}", e)))?;
        }

        if let Ok(value) = std::env::var("CHAIN_API_MAX_PAGE_SIZE") {
            config.max_page_size = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("CHAIN_API_MAX_PAGE_SIZE: {}", e)))?;
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
        let config = ApiConfig::default();
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.max_fee_recursion, 4);
    }

    #[test]
    fn test_from_file_keeps_unset_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "history_limit = 5").unwrap();

        let config = ApiConfig::from_file(file.path()).unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.max_fee_recursion, 4);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "history_limit = \"many\"").unwrap();

        let err = ApiConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
