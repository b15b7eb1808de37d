//! Round pairing generation.
//!
//! Each structural format has its own [`PairingStrategy`], selected through
//! the [`Pairer`] dispatch enum. The [`PairingGenerator`] wraps strategy
//! selection and, for Swiss tournaments, consults the matchmaking oracle
//! first: the oracle proposes skill-balanced pairings and the odd player
//! out is the lowest-rated one. Oracle failures, timeouts and malformed
//! suggestions all fall back to the deterministic strategy, so opening a
//! round never depends on oracle availability.

use enum_dispatch::enum_dispatch;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::matchmaking::{OracleError, OracleResult, RatingOracle};
use crate::tournament::errors::{TournamentError, TournamentResult};
use crate::tournament::models::{
    DeckId, Match, PlayerId, Standing, Tournament, TournamentType,
};

pub mod elimination;
pub mod round_robin;
pub mod swiss;

pub use elimination::{DoubleEliminationPairer, SingleEliminationPairer};
pub use round_robin::RoundRobinPairer;
pub use swiss::SwissPairer;

/// Everything a strategy needs to pair one round
///
/// `active_players` is in registration order with dropped players already
/// removed. `history` holds every match of the tournament so far, ordered
/// by round and match number.
pub struct PairingContext<'a> {
    pub tournament: &'a Tournament,
    pub round: u32,
    pub active_players: &'a [PlayerId],
    pub standings: &'a [Standing],
    pub history: &'a [Match],
}

/// Format-specific pairing algorithm
///
/// Implementations must place every active player in exactly one match or
/// one bye per round, deterministically for a given context.
#[enum_dispatch]
pub trait PairingStrategy {
    fn pair_round(&self, ctx: &PairingContext<'_>) -> Vec<Match>;
}

/// Dispatch over the supported pairing strategies
#[enum_dispatch(PairingStrategy)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pairer {
    Swiss(SwissPairer),
    SingleElimination(SingleEliminationPairer),
    DoubleElimination(DoubleEliminationPairer),
    RoundRobin(RoundRobinPairer),
}

impl Pairer {
    /// Select the strategy for a structural format
    ///
    /// Formats without pairing support are a hard error rather than an
    /// empty round.
    pub fn for_type(tournament_type: TournamentType) -> TournamentResult<Self> {
        match tournament_type {
            TournamentType::Swiss => Ok(Self::Swiss(SwissPairer)),
            TournamentType::SingleElimination => {
                Ok(Self::SingleElimination(SingleEliminationPairer))
            }
            TournamentType::DoubleElimination => {
                Ok(Self::DoubleElimination(DoubleEliminationPairer))
            }
            TournamentType::RoundRobin => Ok(Self::RoundRobin(RoundRobinPairer)),
            TournamentType::SealedDeck | TournamentType::DraftPods => {
                Err(TournamentError::UnsupportedFormat(tournament_type))
            }
        }
    }
}

/// Active players ordered by match points, registration order on ties
fn sorted_by_points(ctx: &PairingContext<'_>) -> Vec<PlayerId> {
    let points: HashMap<PlayerId, u32> = ctx
        .standings
        .iter()
        .map(|s| (s.player_id, s.match_points))
        .collect();
    let mut players = ctx.active_players.to_vec();
    players.sort_by_key(|p| Reverse(points.get(p).copied().unwrap_or(0)));
    players
}

fn deck_for(tournament: &Tournament, player_id: PlayerId) -> Option<DeckId> {
    tournament.participant(player_id).and_then(|p| p.deck_id)
}

/// Produces the match set for a round
#[derive(Clone)]
pub struct PairingGenerator {
    oracle: Option<Arc<dyn RatingOracle>>,
    oracle_timeout: Duration,
}

impl PairingGenerator {
    pub fn new(oracle: Option<Arc<dyn RatingOracle>>, oracle_timeout: Duration) -> Self {
        Self {
            oracle,
            oracle_timeout,
        }
    }

    /// Generate the round's matches, preferring the oracle for Swiss
    pub async fn generate(&self, ctx: &PairingContext<'_>) -> TournamentResult<Vec<Match>> {
        let pairer = Pairer::for_type(ctx.tournament.tournament_type)?;
        let mut matches = match (&self.oracle, ctx.tournament.tournament_type) {
            (Some(oracle), TournamentType::Swiss) => {
                match timeout(self.oracle_timeout, self.oracle_pairings(oracle.as_ref(), ctx))
                    .await
                {
                    Ok(Ok(matches)) => matches,
                    Ok(Err(err)) => {
                        log::warn!(
                            "Oracle pairing failed for tournament {}, using fallback: {err}",
                            ctx.tournament.id
                        );
                        pairer.pair_round(ctx)
                    }
                    Err(_) => {
                        log::warn!(
                            "Oracle pairing timed out after {:?} for tournament {}, using fallback",
                            self.oracle_timeout,
                            ctx.tournament.id
                        );
                        pairer.pair_round(ctx)
                    }
                }
            }
            _ => pairer.pair_round(ctx),
        };
        for m in &mut matches {
            m.player1_deck_id = deck_for(ctx.tournament, m.player1_id);
            m.player2_deck_id = m.player2_id.and_then(|p| deck_for(ctx.tournament, p));
        }
        Ok(matches)
    }

    /// Oracle-assisted Swiss pairing
    ///
    /// For an odd pool the bye goes to the lowest-rated player, chosen
    /// before asking the oracle to pair the even remainder. Suggestions
    /// must cover that remainder exactly or the response is rejected.
    async fn oracle_pairings(
        &self,
        oracle: &dyn RatingOracle,
        ctx: &PairingContext<'_>,
    ) -> OracleResult<Vec<Match>> {
        let format_key = ctx.tournament.format.to_string();
        let mut pool = ctx.active_players.to_vec();

        let bye_player = if pool.len() % 2 == 1 {
            let lowest = lowest_rated(oracle, &pool, &format_key).await?;
            pool.retain(|&p| p != lowest);
            Some(lowest)
        } else {
            None
        };

        let previous_pairs: Vec<(PlayerId, PlayerId)> = ctx
            .history
            .iter()
            .filter_map(|m| m.player2_id.map(|p2| (m.player1_id, p2)))
            .collect();

        let suggestions = oracle
            .generate_pairings(&pool, &format_key, &previous_pairs)
            .await?;

        let eligible: HashSet<PlayerId> = pool.iter().copied().collect();
        let mut seen = HashSet::new();
        for suggestion in &suggestions {
            let (a, b) = suggestion.players;
            if a == b {
                return Err(OracleError::Rejected(format!("player {a} paired with itself")));
            }
            if !eligible.contains(&a) || !eligible.contains(&b) {
                return Err(OracleError::Rejected(
                    "suggestion references a player outside the pool".to_string(),
                ));
            }
            if !seen.insert(a) || !seen.insert(b) {
                return Err(OracleError::Rejected(
                    "player appears in more than one pairing".to_string(),
                ));
            }
        }
        if seen.len() != pool.len() {
            return Err(OracleError::Rejected(format!(
                "{} players left unpaired",
                pool.len() - seen.len()
            )));
        }

        let mut matches: Vec<Match> = suggestions
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                Match::pairing(
                    ctx.tournament.id,
                    ctx.round,
                    i as u32 + 1,
                    s.players.0,
                    s.players.1,
                )
                .with_quality(s.quality)
            })
            .collect();
        if let Some(player) = bye_player {
            matches.push(Match::bye(
                ctx.tournament.id,
                ctx.round,
                matches.len() as u32 + 1,
                player,
            ));
        }
        Ok(matches)
    }
}

/// Pool member with the lowest conservative rating, pool order on ties
async fn lowest_rated(
    oracle: &dyn RatingOracle,
    pool: &[PlayerId],
    format_key: &str,
) -> OracleResult<PlayerId> {
    let mut lowest: Option<(PlayerId, f64)> = None;
    for &player in pool {
        let rating = oracle.get_player_rating(player, format_key).await?;
        let better = match lowest {
            Some((_, best)) => rating.conservative_rating < best,
            None => true,
        };
        if better {
            lowest = Some((player, rating.conservative_rating));
        }
    }
    lowest
        .map(|(player, _)| player)
        .ok_or_else(|| OracleError::Rejected("empty player pool".to_string()))
}
