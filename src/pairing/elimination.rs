//! Bracket pairing for elimination tournaments.

use std::collections::{HashMap, HashSet};

use crate::tournament::models::{Match, MatchResult, PlayerId};

use super::{sorted_by_points, PairingContext, PairingStrategy};

/// Single elimination bracket
///
/// Round 1 seeds the field into a power-of-two bracket so the top seeds
/// meet as late as possible; seeds beyond the field size become byes for
/// their opponents. Later rounds pair the previous round's winners in
/// match order, which preserves bracket structure without storing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleEliminationPairer;

impl PairingStrategy for SingleEliminationPairer {
    fn pair_round(&self, ctx: &PairingContext<'_>) -> Vec<Match> {
        if ctx.round <= 1 {
            seeded_first_round(ctx)
        } else {
            let advancing = advancing_players(ctx);
            pair_survivors(ctx, &advancing)
        }
    }
}

/// Double elimination bracket
///
/// Players with two losses are out. Survivors split into an upper (no
/// losses) and a lower (one loss) bracket, each paired internally in
/// standings order. Once only two players remain the brackets cross for
/// the grand final.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleEliminationPairer;

impl PairingStrategy for DoubleEliminationPairer {
    fn pair_round(&self, ctx: &PairingContext<'_>) -> Vec<Match> {
        let losses = loss_counts(ctx);
        let survivors: Vec<PlayerId> = sorted_by_points(ctx)
            .into_iter()
            .filter(|p| losses.get(p).copied().unwrap_or(0) < 2)
            .collect();

        if survivors.len() == 2 {
            return vec![Match::pairing(
                ctx.tournament.id,
                ctx.round,
                1,
                survivors[0],
                survivors[1],
            )];
        }

        let upper: Vec<PlayerId> = survivors
            .iter()
            .copied()
            .filter(|p| losses.get(p).copied().unwrap_or(0) == 0)
            .collect();
        let lower: Vec<PlayerId> = survivors
            .iter()
            .copied()
            .filter(|p| losses.get(p).copied().unwrap_or(0) == 1)
            .collect();

        let (upper_pairs, upper_bye) = split_pairs(&upper);
        let (lower_pairs, lower_bye) = split_pairs(&lower);

        let mut matches = Vec::new();
        let mut match_number = 1;
        for (a, b) in upper_pairs.into_iter().chain(lower_pairs) {
            matches.push(Match::pairing(ctx.tournament.id, ctx.round, match_number, a, b));
            match_number += 1;
        }
        for player in upper_bye.into_iter().chain(lower_bye) {
            matches.push(Match::bye(ctx.tournament.id, ctx.round, match_number, player));
            match_number += 1;
        }
        matches
    }
}

/// Bracket slot order for a power-of-two field, as 0-based seed indices
///
/// Built by repeated doubling: each seed is joined by its complement in
/// the next bracket size, so seed 0 and seed 1 can only meet in the final.
fn bracket_order(size: usize) -> Vec<usize> {
    let mut order = vec![1usize];
    let mut len = 1;
    while len < size {
        len *= 2;
        let mut next = Vec::with_capacity(len);
        for &seed in &order {
            next.push(seed);
            next.push(len + 1 - seed);
        }
        order = next;
    }
    order.into_iter().map(|seed| seed - 1).collect()
}

fn seeded_first_round(ctx: &PairingContext<'_>) -> Vec<Match> {
    let seeds = sorted_by_points(ctx);
    if seeds.is_empty() {
        return Vec::new();
    }
    let size = seeds.len().next_power_of_two();
    let order = bracket_order(size);
    let mut matches = Vec::with_capacity(size / 2);
    let mut match_number = 1;
    for slot_pair in order.chunks_exact(2) {
        match (seeds.get(slot_pair[0]), seeds.get(slot_pair[1])) {
            (Some(&a), Some(&b)) => {
                matches.push(Match::pairing(ctx.tournament.id, ctx.round, match_number, a, b));
                match_number += 1;
            }
            (Some(&p), None) | (None, Some(&p)) => {
                matches.push(Match::bye(ctx.tournament.id, ctx.round, match_number, p));
                match_number += 1;
            }
            (None, None) => {}
        }
    }
    matches
}

/// Winners of the previous round in match order, minus dropped players
fn advancing_players(ctx: &PairingContext<'_>) -> Vec<PlayerId> {
    let active: HashSet<PlayerId> = ctx.active_players.iter().copied().collect();
    ctx.history
        .iter()
        .filter(|m| m.round + 1 == ctx.round)
        // A drawn bracket match advances the first slot
        .map(|m| m.winner_id().unwrap_or(m.player1_id))
        .filter(|p| active.contains(p))
        .collect()
}

fn pair_survivors(ctx: &PairingContext<'_>, pool: &[PlayerId]) -> Vec<Match> {
    let (pairs, bye) = split_pairs(pool);
    let mut matches = Vec::with_capacity(pairs.len() + 1);
    for (i, &(a, b)) in pairs.iter().enumerate() {
        matches.push(Match::pairing(ctx.tournament.id, ctx.round, i as u32 + 1, a, b));
    }
    if let Some(player) = bye {
        matches.push(Match::bye(
            ctx.tournament.id,
            ctx.round,
            matches.len() as u32 + 1,
            player,
        ));
    }
    matches
}

/// Consecutive pairs; an odd pool byes its leading player
fn split_pairs(pool: &[PlayerId]) -> (Vec<(PlayerId, PlayerId)>, Option<PlayerId>) {
    if pool.len() % 2 == 1 {
        let rest = &pool[1..];
        (
            rest.chunks_exact(2).map(|c| (c[0], c[1])).collect(),
            Some(pool[0]),
        )
    } else {
        (pool.chunks_exact(2).map(|c| (c[0], c[1])).collect(), None)
    }
}

fn loss_counts(ctx: &PairingContext<'_>) -> HashMap<PlayerId, u32> {
    let mut losses = HashMap::new();
    for m in ctx.history {
        let loser = match m.result {
            Some(MatchResult::Player1) => m.player2_id,
            Some(MatchResult::Player2) => Some(m.player1_id),
            _ => None,
        };
        if let Some(loser) = loser {
            *losses.entry(loser).or_insert(0) += 1;
        }
    }
    losses
}
