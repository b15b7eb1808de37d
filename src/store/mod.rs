//! Persistence interface for tournaments, matches and standings.
//!
//! The engine reads and writes through [`TournamentStore`], keeping the
//! storage backend swappable. [`memory::InMemoryStore`] is the bundled
//! implementation; a deployment can substitute a database-backed store
//! without touching the engine.

use async_trait::async_trait;

use crate::tournament::errors::TournamentResult;
use crate::tournament::models::{
    Match, MatchId, PlayerId, Standing, Tournament, TournamentId, TournamentStatus,
};

pub mod memory;

pub use memory::InMemoryStore;

/// Storage backend for the tournament engine
///
/// Listing methods guarantee a deterministic order: tournaments newest
/// first, matches by round then match number, standings by position.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Persist a new tournament
    async fn insert_tournament(&self, tournament: &Tournament) -> TournamentResult<()>;

    /// Fetch a tournament by ID
    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>>;

    /// Overwrite a tournament
    async fn update_tournament(&self, tournament: &Tournament) -> TournamentResult<()>;

    /// List tournaments, optionally filtered by status, newest first
    async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> TournamentResult<Vec<Tournament>>;

    /// Persist a batch of matches
    async fn insert_matches(&self, matches: &[Match]) -> TournamentResult<()>;

    /// Fetch a match by ID
    async fn get_match(&self, id: MatchId) -> TournamentResult<Option<Match>>;

    /// Overwrite a match
    async fn update_match(&self, m: &Match) -> TournamentResult<()>;

    /// All matches of a tournament, ordered by round then match number
    async fn matches_for_tournament(&self, id: TournamentId) -> TournamentResult<Vec<Match>>;

    /// Matches of one round, ordered by match number
    async fn matches_for_round(
        &self,
        id: TournamentId,
        round: u32,
    ) -> TournamentResult<Vec<Match>>;

    /// Persist a new standing row
    async fn insert_standing(&self, standing: &Standing) -> TournamentResult<()>;

    /// Overwrite a batch of standing rows
    async fn update_standings(&self, standings: &[Standing]) -> TournamentResult<()>;

    /// Fetch one player's standing
    async fn get_standing(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<Option<Standing>>;

    /// Remove one player's standing
    async fn delete_standing(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<()>;

    /// All standings of a tournament, ordered by position
    async fn standings_for_tournament(
        &self,
        id: TournamentId,
    ) -> TournamentResult<Vec<Standing>>;
}
