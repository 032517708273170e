//! # Forge-Chain Node Runtime
//!
//! The main entry point for a Forge-Chain node.
//!
//! ## Architecture
//!
//! Each long-running responsibility is an independent, indefinitely-looping
//! worker; workers communicate only through the shared, lock-guarded
//! Account State Store and Chain Store, never directly with each other. One
//! cancellation signal (a watch channel) threads through all of them for
//! coordinated shutdown.
//!
//! ```text
//! Mempool ──batch──▶ Mining Engine ──▶ Chain Store ──broadcast──▶ peers
//!                                          ▲
//!     peers ──announce──▶ Validation Engine┘
//!
//! Consensus Worker: reconciles "latest hash" each round, invokes the
//! Sync Protocol on divergence.
//! ```
//!
//! ## Modular Structure
//!
//! - `container/` - unified node configuration
//! - `genesis`    - genesis document loading and chain initialization
//! - `adapters/`  - port implementations (keystore, sync server)
//! - `runtime`    - subsystem construction, worker wiring, shutdown

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod runtime;

pub use container::NodeConfig;
pub use runtime::NodeRuntime;
