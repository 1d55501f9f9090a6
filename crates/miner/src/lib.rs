//! Scheduler-driven block assembly. See `SPEC_FULL.md` §4.7.

pub mod config;
pub mod errors;
pub mod executor;
pub mod ports;
pub mod service;

pub use config::MinerConfig;
pub use errors::MinerError;
pub use executor::{DefaultTxExecutor, TxExecutor};
pub use ports::{BlockPublisher, ChainTip};
pub use service::Miner;
