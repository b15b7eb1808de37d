//! In-memory tournament store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TournamentStore;
use crate::tournament::errors::TournamentResult;
use crate::tournament::models::{
    Match, MatchId, PlayerId, Standing, Tournament, TournamentId, TournamentStatus,
};
use std::collections::HashMap;

/// Tournament store backed by process memory
///
/// Suitable for embedding the engine in a single process and for tests.
/// All maps are guarded independently; cross-entity consistency comes from
/// the engine's per-tournament serialization, not from the store.
pub struct InMemoryStore {
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
    matches: RwLock<HashMap<MatchId, Match>>,
    standings: RwLock<HashMap<(TournamentId, PlayerId), Standing>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tournaments: RwLock::new(HashMap::new()),
            matches: RwLock::new(HashMap::new()),
            standings: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TournamentStore for InMemoryStore {
    async fn insert_tournament(&self, tournament: &Tournament) -> TournamentResult<()> {
        self.tournaments
            .write()
            .await
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.tournaments.read().await.get(&id).cloned())
    }

    async fn update_tournament(&self, tournament: &Tournament) -> TournamentResult<()> {
        self.tournaments
            .write()
            .await
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> TournamentResult<Vec<Tournament>> {
        let mut tournaments: Vec<Tournament> = self
            .tournaments
            .read()
            .await
            .values()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .cloned()
            .collect();
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tournaments)
    }

    async fn insert_matches(&self, matches: &[Match]) -> TournamentResult<()> {
        let mut guard = self.matches.write().await;
        for m in matches {
            guard.insert(m.id, m.clone());
        }
        Ok(())
    }

    async fn get_match(&self, id: MatchId) -> TournamentResult<Option<Match>> {
        Ok(self.matches.read().await.get(&id).cloned())
    }

    async fn update_match(&self, m: &Match) -> TournamentResult<()> {
        self.matches.write().await.insert(m.id, m.clone());
        Ok(())
    }

    async fn matches_for_tournament(&self, id: TournamentId) -> TournamentResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .matches
            .read()
            .await
            .values()
            .filter(|m| m.tournament_id == id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round, m.match_number));
        Ok(matches)
    }

    async fn matches_for_round(
        &self,
        id: TournamentId,
        round: u32,
    ) -> TournamentResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .matches
            .read()
            .await
            .values()
            .filter(|m| m.tournament_id == id && m.round == round)
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.match_number);
        Ok(matches)
    }

    async fn insert_standing(&self, standing: &Standing) -> TournamentResult<()> {
        self.standings
            .write()
            .await
            .insert((standing.tournament_id, standing.player_id), standing.clone());
        Ok(())
    }

    async fn update_standings(&self, standings: &[Standing]) -> TournamentResult<()> {
        let mut guard = self.standings.write().await;
        for standing in standings {
            guard.insert((standing.tournament_id, standing.player_id), standing.clone());
        }
        Ok(())
    }

    async fn get_standing(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<Option<Standing>> {
        Ok(self
            .standings
            .read()
            .await
            .get(&(tournament_id, player_id))
            .cloned())
    }

    async fn delete_standing(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<()> {
        self.standings
            .write()
            .await
            .remove(&(tournament_id, player_id));
        Ok(())
    }

    async fn standings_for_tournament(
        &self,
        id: TournamentId,
    ) -> TournamentResult<Vec<Standing>> {
        let mut standings: Vec<Standing> = self
            .standings
            .read()
            .await
            .values()
            .filter(|s| s.tournament_id == id)
            .cloned()
            .collect();
        standings.sort_by_key(|s| s.position);
        Ok(standings)
    }
}
