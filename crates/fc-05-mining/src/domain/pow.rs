//! # Proof-of-Work Nonce Search
//!
//! Increment the header nonce and re-digest until the hash carries the
//! required leading zero nibbles. The loop is unbounded by design — bounded
//! only by difficulty and the cancellation flag, which is checked every
//! iteration so shutdown never waits on a lucky hash.

use shared_types::{BlockHash, BlockHeader};
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of a nonce search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A winning nonce and the hash it produces.
    Solved { nonce: u64, hash: BlockHash },
    /// The cancellation flag was observed before a solution.
    Cancelled,
}

/// Search for a nonce satisfying `header.difficulty`.
///
/// Runs on the caller's thread; the worker wraps it in `spawn_blocking`.
pub fn search_nonce(mut header: BlockHeader, cancel: &AtomicBool) -> SearchOutcome {
    let difficulty = header.difficulty;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return SearchOutcome::Cancelled;
        }

        let hash = header.hash();
        if hash.has_leading_zero_nibbles(difficulty) {
            return SearchOutcome::Solved {
                nonce: header.nonce,
                hash,
            };
        }
        header.nonce = header.nonce.wrapping_add(1);
    }
}
