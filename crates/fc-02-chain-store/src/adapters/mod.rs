//! Concrete `KeyValueStore` backends.

pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use memory::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbStore};
