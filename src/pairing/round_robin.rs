//! Rotation pairing for round robin tournaments.

use crate::tournament::models::{Match, PlayerId};

use super::{PairingContext, PairingStrategy};

/// Circle-method round robin
///
/// Keeps the first player fixed and rotates the rest one step per round,
/// pairing opposite ends of the arrangement so everyone meets everyone
/// exactly once over a full schedule. An odd pool rotates a phantom slot
/// through the field, handing a different player a bye each round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRobinPairer;

impl PairingStrategy for RoundRobinPairer {
    fn pair_round(&self, ctx: &PairingContext<'_>) -> Vec<Match> {
        let mut slots: Vec<Option<PlayerId>> =
            ctx.active_players.iter().copied().map(Some).collect();
        if slots.len() % 2 == 1 {
            slots.push(None);
        }
        let n = slots.len();
        if n < 2 {
            return Vec::new();
        }

        let rotation = (ctx.round.saturating_sub(1) as usize) % (n - 1);
        let mut arranged = vec![slots[0]];
        let mut tail = slots[1..].to_vec();
        tail.rotate_right(rotation);
        arranged.extend(tail);

        let mut pairs = Vec::with_capacity(n / 2);
        let mut byes = Vec::new();
        for i in 0..n / 2 {
            match (arranged[i], arranged[n - 1 - i]) {
                (Some(a), Some(b)) => pairs.push((a, b)),
                (Some(p), None) | (None, Some(p)) => byes.push(p),
                (None, None) => {}
            }
        }

        let mut matches = Vec::with_capacity(pairs.len() + byes.len());
        let mut match_number = 1;
        for (a, b) in pairs {
            matches.push(Match::pairing(ctx.tournament.id, ctx.round, match_number, a, b));
            match_number += 1;
        }
        for player in byes {
            matches.push(Match::bye(ctx.tournament.id, ctx.round, match_number, player));
            match_number += 1;
        }
        matches
    }
}
