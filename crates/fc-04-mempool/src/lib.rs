//! # Mempool (Subsystem 4)
//!
//! Holds signed, not-yet-mined transactions and promotes complete batches
//! into the pending-block queue consumed by the Mining Engine. Acceptance is
//! validated synchronously; rejected transactions are never retried.

pub mod errors;
pub mod pool;

pub use errors::MempoolError;
pub use pool::{Mempool, MempoolConfig, PendingBlockQueue};
