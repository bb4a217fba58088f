//! EDC Chain API
//!
//! Read-side services layered over `chain-core`.
//!
//! # Components
//!
//! - **Impact analysis**: which accounts and funds an operation touches
//! - **Database API**: cheque lookups, account queries and fee quotes under
//!   shared read guards
//! - **Account history**: bounded per-account index fed by the chain actor's
//!   notifications
//!
//! # Example
//!
//! ```no_run
//! use chain_api::{spawn_history_indexer, ApiConfig, DatabaseApi};
//! use chain_core::metrics::Metrics;
//! use chain_core::{spawn_chain_actor, Config};
//!
//! #[tokio::main]
//! async fn main() -> chain_api::Result<()> {
//!     let config = Config::default();
//!     let store = config.genesis.build_store(config.chain.clone())?;
//!     let metrics = Metrics::new().map_err(|e| chain_api::Error::Other(e.to_string()))?;
//!     let handle = spawn_chain_actor(store, &config.actor, metrics);
//!
//!     let api_config = ApiConfig::default();
//!     let api = DatabaseApi::new(handle.store(), api_config.clone());
//!     let (history, _task) = spawn_history_indexer(&handle, &api_config);
//!
//!     let committee = api.get_account_by_name("committee-account");
//!     println!("{:?} / {} ops indexed", committee, history.read().total_recorded());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod database_api;
pub mod error;
pub mod history;
pub mod impacted;

// Re-exports
pub use config::ApiConfig;
pub use database_api::{DatabaseApi, TransferFeeInfo};
pub use error::{Error, Result};
pub use history::{spawn_history_indexer, AccountHistory, HistoryEntry};
pub use impacted::{
    get_impacted_items, get_impacted_items_stateless, transaction_impacted_items, ImpactedItems,
};
