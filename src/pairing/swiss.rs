//! Deterministic Swiss pairing.

use crate::tournament::models::Match;

use super::{sorted_by_points, PairingContext, PairingStrategy};

/// Swiss pairing without oracle assistance
///
/// Sorts the active pool by match points (registration order on ties) and
/// pairs consecutive players down the list, so similar records meet each
/// round. An odd pool leaves the last sorted player with a bye. Round 1,
/// where everyone is tied on zero points, pairs in registration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwissPairer;

impl PairingStrategy for SwissPairer {
    fn pair_round(&self, ctx: &PairingContext<'_>) -> Vec<Match> {
        let pool = sorted_by_points(ctx);
        let mut matches = Vec::with_capacity(pool.len() / 2 + 1);
        let mut paired = vec![false; pool.len()];
        let mut match_number = 1;

        for i in 0..pool.len() {
            if paired[i] {
                continue;
            }
            paired[i] = true;
            match (i + 1..pool.len()).find(|&j| !paired[j]) {
                Some(j) => {
                    paired[j] = true;
                    matches.push(Match::pairing(
                        ctx.tournament.id,
                        ctx.round,
                        match_number,
                        pool[i],
                        pool[j],
                    ));
                }
                None => {
                    matches.push(Match::bye(
                        ctx.tournament.id,
                        ctx.round,
                        match_number,
                        pool[i],
                    ));
                }
            }
            match_number += 1;
        }
        matches
    }
}
