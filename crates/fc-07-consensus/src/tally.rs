//! # Majority-Vote Tally
//!
//! The hash with the strictly highest vote count wins. Ties keep the
//! earlier-seen leader: the tally iterates responses in arrival order and
//! replaces the leader only on a strictly greater count, which makes the
//! outcome deterministic for a given response order.

use shared_types::BlockHash;
use std::collections::HashMap;

/// Tally latest-hash votes; `None` when no votes arrived.
pub fn tally(votes: &[BlockHash]) -> Option<BlockHash> {
    let mut counts: HashMap<BlockHash, usize> = HashMap::new();
    let mut leader: Option<(BlockHash, usize)> = None;

    for vote in votes {
        let count = counts.entry(*vote).or_insert(0);
        *count += 1;
        match leader {
            Some((_, best)) if *count <= best => {}
            _ => leader = Some((*vote, *count)),
        }
    }

    leader.map(|(hash, _)| hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> BlockHash {
        BlockHash([byte; 32])
    }

    #[test]
    fn test_empty_votes_no_winner() {
        assert_eq!(tally(&[]), None);
    }

    #[test]
    fn test_majority_wins() {
        // Three peers reporting {A, A, B}: the winner must be A
        let votes = vec![hash(0xA1), hash(0xA1), hash(0xB2)];
        assert_eq!(tally(&votes), Some(hash(0xA1)));
    }

    #[test]
    fn test_majority_wins_regardless_of_order() {
        let votes = vec![hash(0xB2), hash(0xA1), hash(0xA1)];
        assert_eq!(tally(&votes), Some(hash(0xA1)));
    }

    #[test]
    fn test_tie_keeps_first_to_reach_count() {
        let votes = vec![hash(0xB2), hash(0xA1)];
        assert_eq!(tally(&votes), Some(hash(0xB2)));

        // B reaches two votes before A does, so the tie resolves to B
        let votes = vec![hash(0xA1), hash(0xB2), hash(0xB2), hash(0xA1)];
        assert_eq!(tally(&votes), Some(hash(0xB2)));
    }

    #[test]
    fn test_single_vote_wins() {
        assert_eq!(tally(&[hash(0x01)]), Some(hash(0x01)));
    }
}
