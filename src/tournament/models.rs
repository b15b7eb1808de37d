//! Tournament data models: the tournament aggregate, matches and standings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// Player ID type
pub type PlayerId = Uuid;

/// Deck ID type
pub type DeckId = Uuid;

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    /// Created but registration has not opened yet
    Scheduled,
    /// Accepting registrations
    RegistrationOpen,
    /// Registration closed, waiting to start
    RegistrationClosed,
    /// Rounds are being played
    InProgress,
    /// Temporarily halted, resumable
    Paused,
    /// All rounds played, standings final
    Completed,
    /// Called off before completion
    Cancelled,
}

impl TournamentStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the lifecycle state machine allows moving to `next`
    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        use TournamentStatus::*;
        match (self, next) {
            (Scheduled, RegistrationOpen) => true,
            (RegistrationOpen, RegistrationClosed) => true,
            (RegistrationClosed, InProgress) => true,
            (InProgress, Paused) => true,
            (InProgress, Completed) => true,
            (Paused, InProgress) => true,
            (current, Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Scheduled => "Scheduled",
            Self::RegistrationOpen => "Registration Open",
            Self::RegistrationClosed => "Registration Closed",
            Self::InProgress => "In Progress",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{repr}")
    }
}

/// Structural format of a tournament, drives pairing and round count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentType {
    /// Swiss rounds, nobody is eliminated
    Swiss,
    /// Single elimination bracket
    SingleElimination,
    /// Double elimination (two losses eliminate)
    DoubleElimination,
    /// Everyone plays everyone
    RoundRobin,
    /// Sealed deck event (pairing not supported)
    SealedDeck,
    /// Draft pods event (pairing not supported)
    DraftPods,
}

impl TournamentType {
    /// Number of rounds for a field of `max_players`
    ///
    /// Swiss and single elimination use ceil(log2(players)); double
    /// elimination doubles that for the lower bracket; round robin plays
    /// everyone once. Formats without pairing support have no rounds.
    pub fn round_count(&self, max_players: usize) -> u32 {
        match self {
            Self::Swiss | Self::SingleElimination => ceil_log2(max_players),
            Self::DoubleElimination => ceil_log2(max_players) * 2,
            Self::RoundRobin => max_players.saturating_sub(1) as u32,
            Self::SealedDeck | Self::DraftPods => 0,
        }
    }
}

fn ceil_log2(n: usize) -> u32 {
    if n <= 1 { 0 } else { (n - 1).ilog2() + 1 }
}

impl fmt::Display for TournamentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Swiss => "Swiss",
            Self::SingleElimination => "Single Elimination",
            Self::DoubleElimination => "Double Elimination",
            Self::RoundRobin => "Round Robin",
            Self::SealedDeck => "Sealed Deck",
            Self::DraftPods => "Draft Pods",
        };
        write!(f, "{repr}")
    }
}

/// Game format a tournament is played in
///
/// Used as the bucket key for ratings and format-specific point awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameFormat {
    Standard,
    Classic,
    Draft,
    Sealed,
    Commander,
    Pauper,
    Legacy,
    Modern,
}

impl fmt::Display for GameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Standard => "Standard",
            Self::Classic => "Classic",
            Self::Draft => "Draft",
            Self::Sealed => "Sealed",
            Self::Commander => "Commander",
            Self::Pauper => "Pauper",
            Self::Legacy => "Legacy",
            Self::Modern => "Modern",
        };
        write!(f, "{repr}")
    }
}

/// Tournament settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettings {
    /// Maximum players allowed
    pub max_players: usize,
    /// Minimum players required to start
    pub min_players: usize,
    /// Per-match time limit in minutes (None for untimed)
    pub time_limit_minutes: Option<u32>,
    /// Whether players may drop out mid-tournament
    pub allow_drops: bool,
    /// Whether a deck list must be submitted at registration
    pub require_deck_list: bool,
    /// Whether spectators are allowed
    pub allow_spectators: bool,
    /// Whether placement prizes are enabled
    pub prizes_enabled: bool,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            max_players: 8,
            min_players: 2,
            time_limit_minutes: None,
            allow_drops: true,
            require_deck_list: false,
            allow_spectators: true,
            prizes_enabled: false,
        }
    }
}

/// Tournament configuration supplied at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Tournament name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Game format played
    pub format: GameFormat,
    /// Structural format
    pub tournament_type: TournamentType,
    /// Capacity and behavior settings
    pub settings: TournamentSettings,
    /// Scheduled start time
    pub scheduled_start: Option<DateTime<Utc>>,
}

impl TournamentConfig {
    /// Create a standard Swiss configuration for up to `max_players`
    pub fn swiss(name: String, format: GameFormat, max_players: usize) -> Self {
        Self {
            name,
            description: None,
            format,
            tournament_type: TournamentType::Swiss,
            settings: TournamentSettings {
                max_players,
                ..TournamentSettings::default()
            },
            scheduled_start: None,
        }
    }

    /// Use a different structural format
    pub fn with_type(mut self, tournament_type: TournamentType) -> Self {
        self.tournament_type = tournament_type;
        self
    }

    /// Replace the settings wholesale
    pub fn with_settings(mut self, settings: TournamentSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// A registered tournament participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Player ID
    pub player_id: PlayerId,
    /// Deck the player registered with
    pub deck_id: Option<DeckId>,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

/// The tournament aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament ID
    pub id: TournamentId,
    /// Tournament name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Player who owns and administers the tournament
    pub organizer_id: PlayerId,
    /// Game format played
    pub format: GameFormat,
    /// Structural format
    pub tournament_type: TournamentType,
    /// Capacity and behavior settings
    pub settings: TournamentSettings,
    /// Current lifecycle status
    pub status: TournamentStatus,
    /// Round currently being played (0 before the tournament starts)
    pub current_round: u32,
    /// Total rounds, derived from the structural format and capacity
    pub total_rounds: u32,
    /// Registered participants in registration order
    pub participants: Vec<Participant>,
    /// Scheduled start time
    pub scheduled_start: Option<DateTime<Utc>>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Started at timestamp
    pub started_at: Option<DateTime<Utc>>,
    /// Ended at timestamp (completion or cancellation)
    pub ended_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a new tournament from a configuration
    pub fn new(organizer_id: PlayerId, config: TournamentConfig) -> Self {
        let total_rounds = config
            .tournament_type
            .round_count(config.settings.max_players);
        Self {
            id: Uuid::new_v4(),
            name: config.name,
            description: config.description,
            organizer_id,
            format: config.format,
            tournament_type: config.tournament_type,
            settings: config.settings,
            status: TournamentStatus::Scheduled,
            current_round: 0,
            total_rounds,
            participants: Vec::new(),
            scheduled_start: config.scheduled_start,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Whether the tournament has reached its player capacity
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.settings.max_players
    }

    /// Look up a participant by player ID
    pub fn participant(&self, player_id: PlayerId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.player_id == player_id)
    }
}

/// Outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// Player in the first slot won
    Player1,
    /// Player in the second slot won
    Player2,
    /// Match was drawn
    Draw,
    /// No opponent this round
    Bye,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Player1 => "player1",
            Self::Player2 => "player2",
            Self::Draw => "draw",
            Self::Bye => "bye",
        };
        write!(f, "{repr}")
    }
}

/// How evenly matched a proposed pairing is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl BalanceCategory {
    /// Classify a quality score in `[0, 1]`
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::Good
        } else if score >= 0.4 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for BalanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        };
        write!(f, "{repr}")
    }
}

/// Matchmaking assessment of a pairing, carried as an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchQuality {
    /// Quality score in `[0, 1]`
    pub score: f64,
    /// Win probability per player slot
    pub win_probabilities: [f64; 2],
    /// Skill gap between the players
    pub skill_difference: f64,
    /// Combined rating uncertainty
    pub uncertainty_factor: f64,
    /// Coarse classification of the score
    pub balance_category: BalanceCategory,
}

/// A single match within a tournament round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Match ID
    pub id: MatchId,
    /// Owning tournament
    pub tournament_id: TournamentId,
    /// Round number (1-indexed)
    pub round: u32,
    /// Sequence number within the round (1-indexed)
    pub match_number: u32,
    /// First player slot, always present
    pub player1_id: PlayerId,
    /// Second player slot, absent for a bye
    pub player2_id: Option<PlayerId>,
    /// Deck registered by the first player
    pub player1_deck_id: Option<DeckId>,
    /// Deck registered by the second player
    pub player2_deck_id: Option<DeckId>,
    /// Games won by the first player
    pub player1_wins: u32,
    /// Games won by the second player
    pub player2_wins: u32,
    /// Drawn games
    pub draws: u32,
    /// Derived outcome, set when the match completes
    pub result: Option<MatchResult>,
    /// Whether a result has been recorded
    pub is_complete: bool,
    /// Matchmaking quality annotation, when pairing came from the oracle
    pub quality: Option<MatchQuality>,
    /// Judge assigned to the match
    pub judge_id: Option<PlayerId>,
    /// Free-text notes
    pub notes: Option<String>,
    /// When the match was paired
    pub started_at: Option<DateTime<Utc>>,
    /// When the result was recorded
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Create an open match between two players
    pub fn pairing(
        tournament_id: TournamentId,
        round: u32,
        match_number: u32,
        player1_id: PlayerId,
        player2_id: PlayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            player1_id,
            player2_id: Some(player2_id),
            player1_deck_id: None,
            player2_deck_id: None,
            player1_wins: 0,
            player2_wins: 0,
            draws: 0,
            result: None,
            is_complete: false,
            quality: None,
            judge_id: None,
            notes: None,
            started_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    /// Create a bye match, already complete
    pub fn bye(
        tournament_id: TournamentId,
        round: u32,
        match_number: u32,
        player_id: PlayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            player1_id: player_id,
            player2_id: None,
            player1_deck_id: None,
            player2_deck_id: None,
            player1_wins: 0,
            player2_wins: 0,
            draws: 0,
            result: Some(MatchResult::Bye),
            is_complete: true,
            quality: None,
            judge_id: None,
            notes: Some("Bye round".to_string()),
            started_at: None,
            completed_at: None,
        }
    }

    /// Attach registered decks to the player slots
    pub fn with_decks(mut self, player1_deck: Option<DeckId>, player2_deck: Option<DeckId>) -> Self {
        self.player1_deck_id = player1_deck;
        self.player2_deck_id = player2_deck;
        self
    }

    /// Attach a matchmaking quality annotation
    pub fn with_quality(mut self, quality: MatchQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Whether this match is a bye
    pub fn is_bye(&self) -> bool {
        self.player2_id.is_none()
    }

    /// Whether the given player occupies either slot
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == Some(player_id)
    }

    /// The winning player, if the match has a decisive outcome
    pub fn winner_id(&self) -> Option<PlayerId> {
        match self.result {
            Some(MatchResult::Player1) | Some(MatchResult::Bye) => Some(self.player1_id),
            Some(MatchResult::Player2) => self.player2_id,
            _ => None,
        }
    }

    /// Record a submitted result and derive the outcome
    ///
    /// Marks the match complete and stamps the completion time. The caller
    /// is responsible for rejecting matches that are already complete.
    pub fn record_result(
        &mut self,
        player1_wins: u32,
        player2_wins: u32,
        draws: u32,
        notes: Option<String>,
    ) -> MatchResult {
        self.player1_wins = player1_wins;
        self.player2_wins = player2_wins;
        self.draws = draws;
        let result = if player1_wins > player2_wins {
            MatchResult::Player1
        } else if player2_wins > player1_wins {
            MatchResult::Player2
        } else {
            MatchResult::Draw
        };
        self.result = Some(result);
        self.is_complete = true;
        self.completed_at = Some(Utc::now());
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        result
    }
}

/// Result scores submitted for a match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResultSubmission {
    /// Games won by the first player
    pub player1_wins: u32,
    /// Games won by the second player
    pub player2_wins: u32,
    /// Drawn games
    pub draws: u32,
    /// Free-text notes
    pub notes: Option<String>,
}

/// A player's computed rank and record within one tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// Owning tournament
    pub tournament_id: TournamentId,
    /// Player this row belongs to
    pub player_id: PlayerId,
    /// Rank within the tournament (1-indexed)
    pub position: u32,
    /// Match points: 3 per win, 1 per draw
    pub match_points: u32,
    /// Game points: 3 per game win
    pub game_points: u32,
    /// Matches won
    pub wins: u32,
    /// Matches lost
    pub losses: u32,
    /// Matches drawn
    pub draws: u32,
    /// Percentage of individual games won
    pub game_win_percentage: f64,
    /// Carried for interchange, not computed
    pub opponent_match_win_percentage: f64,
    /// Carried for interchange, not computed
    pub opponent_game_win_percentage: f64,
    /// Whether the player dropped out
    pub has_dropped: bool,
    /// Round the player dropped in
    pub dropped_in_round: Option<u32>,
}

impl Standing {
    /// Create a placeholder standing at registration time
    pub fn new(tournament_id: TournamentId, player_id: PlayerId, position: u32) -> Self {
        Self {
            tournament_id,
            player_id,
            position,
            match_points: 0,
            game_points: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            game_win_percentage: 0.0,
            opponent_match_win_percentage: 0.0,
            opponent_game_win_percentage: 0.0,
            has_dropped: false,
            dropped_in_round: None,
        }
    }
}

/// Aggregate statistics for a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentStatistics {
    /// Registered participant count
    pub total_players: usize,
    /// Rounds reached so far
    pub completed_rounds: u32,
    /// Matches created across all rounds
    pub total_matches: usize,
    /// Matches with a recorded result
    pub completed_matches: usize,
    /// Mean played-match duration in minutes, byes excluded
    pub average_match_minutes: Option<f64>,
    /// Top of the current standings (at most eight rows)
    pub top_standings: Vec<Standing>,
}
