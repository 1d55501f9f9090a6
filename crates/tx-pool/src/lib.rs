//! Pending-transaction tracking: accepting, packaging, and de-duplicating
//! transactions against the not-yet-stable portion of the chain.

pub mod config;
pub mod errors;
pub mod pool;
pub mod ports;
pub mod verify;

pub use config::TxPoolConfig;
pub use errors::TxBodyError;
pub use pool::TxPool;
pub use ports::BlockLookup;
pub use verify::{block_hash, tx_hash, tx_signing_hash, verify_tx_batch, verify_tx_body};
