//! Port implementations connecting subsystems to the outside world.

pub mod keystore;
pub mod sync_server;

pub use keystore::StaticKeystore;
pub use sync_server::SyncServer;
