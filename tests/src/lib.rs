//! # Forge-Chain Test Suite
//!
//! Unified test crate for cross-subsystem flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Multi-node choreography over the in-memory hub
//!     └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p fc-tests
//!
//! # By category
//! cargo test -p fc-tests integration::
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod integration;
