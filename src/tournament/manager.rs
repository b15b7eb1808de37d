//! Tournament manager: lifecycle, registration, pairing and results.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;

use crate::awards::CompletionAwarder;
use crate::config::EngineConfig;
use crate::directory::RosterDirectory;
use crate::matchmaking::{RankedOutcome, RatingOracle};
use crate::pairing::{Pairer, PairingContext, PairingGenerator};
use crate::progression::PointLedger;
use crate::standings;
use crate::store::TournamentStore;

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    DeckId, Match, MatchId, MatchResult, MatchResultSubmission, Participant, PlayerId, Standing,
    Tournament, TournamentConfig, TournamentId, TournamentStatistics, TournamentStatus,
};

/// Coordinates tournaments from creation through completion
///
/// All writes to one tournament's aggregate (results, standings, round
/// advancement) are serialized through a per-tournament lock, so standings
/// always reflect a consistent match snapshot and a round is never paired
/// twice.
#[derive(Clone)]
pub struct TournamentManager {
    store: Arc<dyn TournamentStore>,
    roster: Arc<dyn RosterDirectory>,
    oracle: Option<Arc<dyn RatingOracle>>,
    pairing: PairingGenerator,
    awarder: CompletionAwarder,
    config: EngineConfig,
    locks: Arc<RwLock<HashMap<TournamentId, Arc<Mutex<()>>>>>,
}

impl TournamentManager {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        roster: Arc<dyn RosterDirectory>,
        ledger: Arc<dyn PointLedger>,
        oracle: Option<Arc<dyn RatingOracle>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            roster,
            pairing: PairingGenerator::new(oracle.clone(), config.oracle_timeout),
            awarder: CompletionAwarder::new(ledger),
            oracle,
            config,
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a tournament owned by `organizer_id`
    pub async fn create_tournament(
        &self,
        organizer_id: PlayerId,
        config: TournamentConfig,
    ) -> TournamentResult<Tournament> {
        let settings = &config.settings;
        if settings.min_players < 2 || settings.max_players < settings.min_players {
            return Err(TournamentError::InvalidCapacity {
                min_players: settings.min_players,
                max_players: settings.max_players,
            });
        }
        let tournament = Tournament::new(organizer_id, config);
        self.store.insert_tournament(&tournament).await?;
        log::info!(
            "Created tournament {} ({}, {})",
            tournament.id,
            tournament.tournament_type,
            tournament.format
        );
        Ok(tournament)
    }

    /// Open the tournament for registrations
    pub async fn open_registration(
        &self,
        id: TournamentId,
        requester: PlayerId,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        Self::ensure_status(&tournament, TournamentStatus::Scheduled)?;
        tournament.status = TournamentStatus::RegistrationOpen;
        self.store.update_tournament(&tournament).await?;
        log::info!("Opened registration for tournament {id}");
        Ok(tournament)
    }

    /// Close the tournament to further registrations
    pub async fn close_registration(
        &self,
        id: TournamentId,
        requester: PlayerId,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        Self::ensure_status(&tournament, TournamentStatus::RegistrationOpen)?;
        tournament.status = TournamentStatus::RegistrationClosed;
        self.store.update_tournament(&tournament).await?;
        log::info!(
            "Closed registration for tournament {id} with {} players",
            tournament.participants.len()
        );
        Ok(tournament)
    }

    /// Register a player, optionally with a deck
    pub async fn register_player(
        &self,
        id: TournamentId,
        player_id: PlayerId,
        deck_id: Option<DeckId>,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_status(&tournament, TournamentStatus::RegistrationOpen)?;
        if tournament.is_full() {
            return Err(TournamentError::TournamentFull {
                max_players: tournament.settings.max_players,
            });
        }
        if tournament.participant(player_id).is_some() {
            return Err(TournamentError::AlreadyRegistered);
        }
        if !self.roster.player_exists(player_id).await? {
            return Err(TournamentError::PlayerNotFound(player_id));
        }
        if tournament.settings.require_deck_list && deck_id.is_none() {
            return Err(TournamentError::DeckListRequired);
        }
        if let Some(deck_id) = deck_id {
            let profile = self
                .roster
                .find_deck(deck_id)
                .await?
                .ok_or(TournamentError::DeckNotFound(deck_id))?;
            if profile.format != tournament.format {
                return Err(TournamentError::DeckFormatMismatch);
            }
            if !profile.is_legal {
                return Err(TournamentError::IllegalDeck {
                    deck_id,
                    format: tournament.format,
                });
            }
        }

        tournament.participants.push(Participant {
            player_id,
            deck_id,
            registered_at: Utc::now(),
        });
        let standing = Standing::new(id, player_id, tournament.participants.len() as u32);
        self.store.update_tournament(&tournament).await?;
        self.store.insert_standing(&standing).await?;
        log::info!(
            "Registered player {player_id} for tournament {id} ({} of {})",
            tournament.participants.len(),
            tournament.settings.max_players
        );
        Ok(tournament)
    }

    /// Withdraw a registration before the tournament starts
    ///
    /// Players may withdraw themselves; the organizer may withdraw anyone.
    pub async fn unregister_player(
        &self,
        id: TournamentId,
        player_id: PlayerId,
        requester: PlayerId,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        if requester != player_id {
            Self::ensure_organizer(&tournament, requester)?;
        }
        match tournament.status {
            TournamentStatus::InProgress | TournamentStatus::Paused => {
                return Err(TournamentError::UnregisterAfterStart);
            }
            status if status.is_terminal() => {
                return Err(TournamentError::AlreadyEnded(status));
            }
            _ => {}
        }
        let before = tournament.participants.len();
        tournament.participants.retain(|p| p.player_id != player_id);
        if tournament.participants.len() == before {
            return Err(TournamentError::NotRegistered(player_id));
        }
        self.store.update_tournament(&tournament).await?;
        self.store.delete_standing(id, player_id).await?;
        log::info!("Unregistered player {player_id} from tournament {id}");
        Ok(tournament)
    }

    /// Start the tournament and pair round 1
    pub async fn start_tournament(
        &self,
        id: TournamentId,
        requester: PlayerId,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        Self::ensure_status(&tournament, TournamentStatus::RegistrationClosed)?;
        if tournament.participants.len() < tournament.settings.min_players {
            return Err(TournamentError::InsufficientPlayers {
                needed: tournament.settings.min_players,
                current: tournament.participants.len(),
            });
        }
        // Fail before any state changes if the format cannot be paired
        Pairer::for_type(tournament.tournament_type)?;

        tournament.status = TournamentStatus::InProgress;
        tournament.current_round = 1;
        tournament.started_at = Some(Utc::now());
        self.store.update_tournament(&tournament).await?;
        log::info!(
            "Started tournament {id}: {} players, {} rounds",
            tournament.participants.len(),
            tournament.total_rounds
        );

        let created = self.open_round(&tournament, 1).await?;
        if created.iter().any(|m| m.is_complete) {
            self.recompute_standings(id).await?;
        }
        self.check_round_completion(&mut tournament).await?;
        Ok(tournament)
    }

    /// Pair the current round if it has no matches yet
    ///
    /// Rounds are normally paired automatically as previous rounds finish;
    /// this entry point lets an organizer retry after a storage failure
    /// left the current round without matches.
    pub async fn generate_pairings(
        &self,
        id: TournamentId,
        round: u32,
        requester: PlayerId,
    ) -> TournamentResult<Vec<Match>> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        Self::ensure_status(&tournament, TournamentStatus::InProgress)?;
        if round != tournament.current_round {
            return Err(TournamentError::RoundNotCurrent {
                requested: round,
                current: tournament.current_round,
            });
        }
        if !self.store.matches_for_round(id, round).await?.is_empty() {
            return Err(TournamentError::RoundAlreadyPaired { round });
        }

        let created = self.open_round(&tournament, round).await?;
        if created.iter().any(|m| m.is_complete) {
            self.recompute_standings(id).await?;
        }
        self.check_round_completion(&mut tournament).await?;
        Ok(created)
    }

    /// Record a match result and drive round completion
    pub async fn submit_match_result(
        &self,
        match_id: MatchId,
        submission: MatchResultSubmission,
        submitter: PlayerId,
    ) -> TournamentResult<Match> {
        let probe = self
            .store
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let lock = self.lock_for(probe.tournament_id).await;
        let _guard = lock.lock().await;

        let tournament = self.require_tournament(probe.tournament_id).await?;
        // Reloaded under the lock so a concurrent submission is caught
        let mut m = self
            .store
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        Self::ensure_status(&tournament, TournamentStatus::InProgress)?;
        if !Self::can_submit(&tournament, &m, submitter) {
            return Err(TournamentError::NotAuthorized(submitter));
        }
        if m.is_bye() {
            return Err(TournamentError::ByeMatch);
        }
        if m.is_complete {
            return Err(TournamentError::MatchAlreadyComplete);
        }

        let result = m.record_result(
            submission.player1_wins,
            submission.player2_wins,
            submission.draws,
            submission.notes,
        );
        self.store.update_match(&m).await?;
        log::info!(
            "Recorded {result} for match {} (round {}) in tournament {}",
            m.id,
            m.round,
            m.tournament_id
        );

        self.report_match_outcome(&tournament, &m).await;
        self.recompute_standings(tournament.id).await?;
        let mut tournament = tournament;
        self.check_round_completion(&mut tournament).await?;
        Ok(m)
    }

    /// Mark a player as dropped
    ///
    /// The player keeps their standing row and past results but is
    /// excluded from all future pairings.
    pub async fn drop_player(
        &self,
        id: TournamentId,
        player_id: PlayerId,
        requester: PlayerId,
    ) -> TournamentResult<Standing> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let tournament = self.require_tournament(id).await?;
        if requester != player_id {
            Self::ensure_organizer(&tournament, requester)?;
        }
        if tournament.status.is_terminal() {
            return Err(TournamentError::AlreadyEnded(tournament.status));
        }
        if !tournament.settings.allow_drops {
            return Err(TournamentError::DropsNotAllowed);
        }
        let mut standing = self
            .store
            .get_standing(id, player_id)
            .await?
            .ok_or(TournamentError::NotRegistered(player_id))?;
        if standing.has_dropped {
            return Err(TournamentError::AlreadyDropped);
        }
        standing.has_dropped = true;
        standing.dropped_in_round = Some(tournament.current_round);
        self.store
            .update_standings(std::slice::from_ref(&standing))
            .await?;
        log::info!(
            "Player {player_id} dropped from tournament {id} in round {}",
            tournament.current_round
        );
        Ok(standing)
    }

    /// Pause an in-progress tournament
    pub async fn pause_tournament(
        &self,
        id: TournamentId,
        requester: PlayerId,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        Self::ensure_status(&tournament, TournamentStatus::InProgress)?;
        tournament.status = TournamentStatus::Paused;
        self.store.update_tournament(&tournament).await?;
        log::info!("Paused tournament {id}");
        Ok(tournament)
    }

    /// Resume a paused tournament
    pub async fn resume_tournament(
        &self,
        id: TournamentId,
        requester: PlayerId,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        Self::ensure_status(&tournament, TournamentStatus::Paused)?;
        tournament.status = TournamentStatus::InProgress;
        self.store.update_tournament(&tournament).await?;
        log::info!("Resumed tournament {id}");
        Ok(tournament)
    }

    /// Cancel a tournament in any non-terminal state
    pub async fn cancel_tournament(
        &self,
        id: TournamentId,
        requester: PlayerId,
    ) -> TournamentResult<Tournament> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut tournament = self.require_tournament(id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        if !tournament
            .status
            .can_transition_to(TournamentStatus::Cancelled)
        {
            return Err(TournamentError::AlreadyEnded(tournament.status));
        }
        tournament.status = TournamentStatus::Cancelled;
        tournament.ended_at = Some(Utc::now());
        self.store.update_tournament(&tournament).await?;
        log::info!("Cancelled tournament {id}");
        Ok(tournament)
    }

    /// Assign a judge who may submit results for the match
    pub async fn assign_judge(
        &self,
        match_id: MatchId,
        judge_id: PlayerId,
        requester: PlayerId,
    ) -> TournamentResult<Match> {
        let probe = self
            .store
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let lock = self.lock_for(probe.tournament_id).await;
        let _guard = lock.lock().await;

        let tournament = self.require_tournament(probe.tournament_id).await?;
        Self::ensure_organizer(&tournament, requester)?;
        let mut m = self
            .store
            .get_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if m.is_bye() {
            return Err(TournamentError::ByeMatch);
        }
        if m.is_complete {
            return Err(TournamentError::MatchAlreadyComplete);
        }
        m.judge_id = Some(judge_id);
        self.store.update_match(&m).await?;
        log::info!("Assigned judge {judge_id} to match {match_id}");
        Ok(m)
    }

    /// Fetch a tournament
    pub async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.require_tournament(id).await
    }

    /// List tournaments, optionally filtered by status
    pub async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> TournamentResult<Vec<Tournament>> {
        self.store.list_tournaments(status).await
    }

    /// Current standings, best position first
    pub async fn get_standings(&self, id: TournamentId) -> TournamentResult<Vec<Standing>> {
        self.require_tournament(id).await?;
        self.store.standings_for_tournament(id).await
    }

    /// Matches of one round, or the whole tournament
    pub async fn get_matches(
        &self,
        id: TournamentId,
        round: Option<u32>,
    ) -> TournamentResult<Vec<Match>> {
        self.require_tournament(id).await?;
        match round {
            Some(round) => self.store.matches_for_round(id, round).await,
            None => self.store.matches_for_tournament(id).await,
        }
    }

    /// Aggregate statistics for display
    pub async fn get_statistics(
        &self,
        id: TournamentId,
    ) -> TournamentResult<TournamentStatistics> {
        let tournament = self.require_tournament(id).await?;
        let matches = self.store.matches_for_tournament(id).await?;
        let standings = self.store.standings_for_tournament(id).await?;

        let completed_matches = matches.iter().filter(|m| m.is_complete).count();
        let durations: Vec<f64> = matches
            .iter()
            .filter(|m| m.is_complete && !m.is_bye())
            .filter_map(|m| match (m.started_at, m.completed_at) {
                (Some(start), Some(end)) => {
                    Some((end - start).num_milliseconds() as f64 / 60_000.0)
                }
                _ => None,
            })
            .collect();
        let average_match_minutes = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum::<f64>() / durations.len() as f64)
        };

        Ok(TournamentStatistics {
            total_players: tournament.participants.len(),
            completed_rounds: tournament.current_round,
            total_matches: matches.len(),
            completed_matches,
            average_match_minutes,
            top_standings: standings.into_iter().take(8).collect(),
        })
    }

    async fn lock_for(&self, id: TournamentId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&id) {
            return lock.clone();
        }
        self.locks.write().await.entry(id).or_default().clone()
    }

    async fn require_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .get_tournament(id)
            .await?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn ensure_organizer(tournament: &Tournament, requester: PlayerId) -> TournamentResult<()> {
        if tournament.organizer_id != requester {
            return Err(TournamentError::NotAuthorized(requester));
        }
        Ok(())
    }

    fn ensure_status(
        tournament: &Tournament,
        expected: TournamentStatus,
    ) -> TournamentResult<()> {
        if tournament.status != expected {
            return Err(TournamentError::InvalidState {
                expected,
                actual: tournament.status,
            });
        }
        Ok(())
    }

    fn can_submit(tournament: &Tournament, m: &Match, submitter: PlayerId) -> bool {
        m.involves(submitter)
            || m.judge_id == Some(submitter)
            || tournament.organizer_id == submitter
    }

    /// Forward a completed result to the rating oracle, best-effort
    async fn report_match_outcome(&self, tournament: &Tournament, m: &Match) {
        let Some(oracle) = &self.oracle else { return };
        let Some(opponent) = m.player2_id else { return };
        let outcomes = match m.result {
            Some(MatchResult::Player1) => vec![
                RankedOutcome {
                    player_id: m.player1_id,
                    rank: 1,
                },
                RankedOutcome {
                    player_id: opponent,
                    rank: 2,
                },
            ],
            Some(MatchResult::Player2) => vec![
                RankedOutcome {
                    player_id: opponent,
                    rank: 1,
                },
                RankedOutcome {
                    player_id: m.player1_id,
                    rank: 2,
                },
            ],
            Some(MatchResult::Draw) => vec![
                RankedOutcome {
                    player_id: m.player1_id,
                    rank: 1,
                },
                RankedOutcome {
                    player_id: opponent,
                    rank: 1,
                },
            ],
            _ => return,
        };
        let format_key = tournament.format.to_string();
        let update = oracle.update_ratings(&format_key, &outcomes, tournament.id, m.id);
        match timeout(self.config.oracle_timeout, update).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => log::warn!("Rating update failed for match {}: {err}", m.id),
            Err(_) => log::warn!("Rating update timed out for match {}", m.id),
        }
    }

    async fn recompute_standings(&self, id: TournamentId) -> TournamentResult<()> {
        let matches = self.store.matches_for_tournament(id).await?;
        let mut standings = self.store.standings_for_tournament(id).await?;
        standings::recompute(&matches, &mut standings);
        self.store.update_standings(&standings).await?;
        Ok(())
    }

    /// Generate and persist the matches for one round
    async fn open_round(
        &self,
        tournament: &Tournament,
        round: u32,
    ) -> TournamentResult<Vec<Match>> {
        let standings = self.store.standings_for_tournament(tournament.id).await?;
        let dropped: HashSet<PlayerId> = standings
            .iter()
            .filter(|s| s.has_dropped)
            .map(|s| s.player_id)
            .collect();
        let active: Vec<PlayerId> = tournament
            .participants
            .iter()
            .map(|p| p.player_id)
            .filter(|p| !dropped.contains(p))
            .collect();
        let history = self.store.matches_for_tournament(tournament.id).await?;

        let ctx = PairingContext {
            tournament,
            round,
            active_players: &active,
            standings: &standings,
            history: &history,
        };
        let matches = self.pairing.generate(&ctx).await?;
        self.store.insert_matches(&matches).await?;
        log::info!(
            "Paired round {round} of tournament {}: {} matches",
            tournament.id,
            matches.len()
        );
        Ok(matches)
    }

    /// Advance rounds while the current one is fully complete
    ///
    /// Byes complete at creation, so a freshly opened round can itself be
    /// complete; the loop keeps advancing until an open match or the end
    /// of the tournament is reached. Completion stamps the end time and
    /// triggers placement awards; an award failure is logged and does not
    /// revert completion.
    async fn check_round_completion(
        &self,
        tournament: &mut Tournament,
    ) -> TournamentResult<()> {
        loop {
            let round_matches = self
                .store
                .matches_for_round(tournament.id, tournament.current_round)
                .await?;
            if !round_matches.iter().all(|m| m.is_complete) {
                return Ok(());
            }

            if tournament.current_round >= tournament.total_rounds {
                tournament.status = TournamentStatus::Completed;
                tournament.ended_at = Some(Utc::now());
                self.store.update_tournament(tournament).await?;
                log::info!(
                    "Tournament {} completed after {} rounds",
                    tournament.id,
                    tournament.current_round
                );
                let standings = self.store.standings_for_tournament(tournament.id).await?;
                if let Err(err) = self.awarder.award(tournament, &standings).await {
                    log::warn!(
                        "Placement awards failed for tournament {}: {err}",
                        tournament.id
                    );
                }
                return Ok(());
            }

            tournament.current_round += 1;
            self.store.update_tournament(tournament).await?;
            log::info!(
                "Advancing tournament {} to round {}",
                tournament.id,
                tournament.current_round
            );
            let created = self
                .open_round(tournament, tournament.current_round)
                .await?;
            if created.iter().any(|m| m.is_complete) {
                self.recompute_standings(tournament.id).await?;
            }
        }
    }
}
