//! # Validation Engine (Subsystem 6)
//!
//! Receives blocks proposed by other nodes and drives each through the
//! staged acceptance state machine: authority check (PoA), structural and
//! fraud checks against the local parent and state root, balance
//! application, and persistence.

pub mod errors;
pub mod service;
pub mod state_machine;

pub use errors::ValidationError;
pub use service::{ValidationConfig, ValidationEngine};
pub use state_machine::{check_authority, check_structure, ValidationStage};
