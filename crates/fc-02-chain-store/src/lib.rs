//! # Block/Chain Store (Subsystem 2)
//!
//! Append-only persistence for `BlockData` keyed by block hash, plus the
//! "latest hash" pointer, over a pluggable durable key-value port. Two
//! backends ship: `InMemoryKVStore` for tests and in-memory nodes, and
//! `RocksDbStore` (feature `rocksdb`) for production.

pub mod adapters;
pub mod errors;
pub mod ports;
pub mod store;

pub use adapters::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use errors::{ChainStoreError, KVStoreError};
pub use ports::KeyValueStore;
pub use store::ChainStore;
