//! Matchmaking oracle interface.
//!
//! Swiss pairing can delegate to an external rating service that proposes
//! skill-balanced pairings and tracks per-format ratings. The engine talks
//! to it through [`RatingOracle`]; production deployments wire in a client
//! for the rating service, tests use [`mock::MockRatingOracle`].
//!
//! The oracle is advisory. Every call site is expected to survive oracle
//! failure by falling back to deterministic pairing, so implementations
//! should surface errors rather than block.

use async_trait::async_trait;
use thiserror::Error;

use crate::tournament::models::{MatchId, MatchQuality, PlayerId, TournamentId};

/// A player's rating snapshot in one game format
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRating {
    /// Conservative skill estimate, lower means less established
    pub conservative_rating: f64,
}

/// A player's final rank in a completed match, reported to the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedOutcome {
    /// Player the rank applies to
    pub player_id: PlayerId,
    /// Rank within the match, 1 is best; equal ranks mean a draw
    pub rank: u32,
}

/// A pairing proposed by the oracle
#[derive(Debug, Clone, PartialEq)]
pub struct PairingSuggestion {
    /// The two players to pair
    pub players: (PlayerId, PlayerId),
    /// Quality assessment of the pairing
    pub quality: MatchQuality,
}

/// Errors surfaced by an oracle
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// Oracle could not be reached or failed internally
    #[error("Matchmaking oracle unavailable: {0}")]
    Unavailable(String),

    /// Oracle responded with unusable suggestions
    #[error("Matchmaking oracle response rejected: {0}")]
    Rejected(String),
}

/// Result type for oracle calls
pub type OracleResult<T> = Result<T, OracleError>;

/// External matchmaking and rating service
#[async_trait]
pub trait RatingOracle: Send + Sync {
    /// Propose pairings for the given pool
    ///
    /// `previous_pairs` lists player pairs that already met in this
    /// tournament so the oracle can avoid repeats.
    async fn generate_pairings(
        &self,
        players: &[PlayerId],
        format_key: &str,
        previous_pairs: &[(PlayerId, PlayerId)],
    ) -> OracleResult<Vec<PairingSuggestion>>;

    /// Fetch a player's rating in one format
    async fn get_player_rating(
        &self,
        player_id: PlayerId,
        format_key: &str,
    ) -> OracleResult<PlayerRating>;

    /// Report a completed match so ratings can be updated
    async fn update_ratings(
        &self,
        format_key: &str,
        outcomes: &[RankedOutcome],
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> OracleResult<()>;
}
