//! Error types for tournament operations.

use thiserror::Error;

use super::models::{
    DeckId, GameFormat, MatchId, PlayerId, TournamentId, TournamentStatus, TournamentType,
};

/// Errors that can occur during tournament operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TournamentError {
    /// Tournament not found
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    /// Match not found
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Player not found in the roster directory
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// Player is not registered for the tournament
    #[error("Player {0} is not registered for this tournament")]
    NotRegistered(PlayerId),

    /// Deck not found in the roster directory
    #[error("Deck not found: {0}")]
    DeckNotFound(DeckId),

    /// Player already registered
    #[error("Player is already registered for this tournament")]
    AlreadyRegistered,

    /// Tournament at capacity
    #[error("Tournament is full ({max_players} players)")]
    TournamentFull { max_players: usize },

    /// Capacity settings are inconsistent
    #[error("Invalid capacity: min {min_players}, max {max_players}")]
    InvalidCapacity {
        min_players: usize,
        max_players: usize,
    },

    /// Operation requires a different lifecycle state
    #[error("Invalid tournament state: expected {expected}, got {actual}")]
    InvalidState {
        expected: TournamentStatus,
        actual: TournamentStatus,
    },

    /// Not enough players to start
    #[error("Insufficient players: need {needed}, have {current}")]
    InsufficientPlayers { needed: usize, current: usize },

    /// Structural format has no pairing support
    #[error("Pairing is not supported for {0} tournaments")]
    UnsupportedFormat(TournamentType),

    /// Round already has matches
    #[error("Round {round} already has pairings")]
    RoundAlreadyPaired { round: u32 },

    /// Pairings may only be generated for the current round
    #[error("Cannot pair round {requested}, current round is {current}")]
    RoundNotCurrent { requested: u32, current: u32 },

    /// Match already has a recorded result
    #[error("Match result has already been recorded")]
    MatchAlreadyComplete,

    /// Byes resolve automatically and take no submissions
    #[error("Cannot submit a result for a bye match")]
    ByeMatch,

    /// Caller lacks permission for the operation
    #[error("Player {0} is not authorized for this operation")]
    NotAuthorized(PlayerId),

    /// Registration requires a deck list
    #[error("A deck list is required to register for this tournament")]
    DeckListRequired,

    /// Deck does not match the tournament format
    #[error("Deck format does not match the tournament format")]
    DeckFormatMismatch,

    /// Deck is not legal in its format
    #[error("Deck {deck_id} is not legal in {format}")]
    IllegalDeck { deck_id: DeckId, format: GameFormat },

    /// Tournament settings forbid drops
    #[error("Drops are not allowed in this tournament")]
    DropsNotAllowed,

    /// Player has already dropped
    #[error("Player has already dropped from this tournament")]
    AlreadyDropped,

    /// Unregistering is only possible before the tournament starts
    #[error("Cannot unregister after the tournament has started; drop instead")]
    UnregisterAfterStart,

    /// Tournament already reached a terminal state
    #[error("Tournament has already ended: {0}")]
    AlreadyEnded(TournamentStatus),

    /// Roster directory failure
    #[error("Roster error: {0}")]
    Roster(#[from] crate::directory::DirectoryError),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Coarse classification used to map errors onto transport responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request is malformed or violates a rule
    Validation,
    /// Request conflicts with current state
    Conflict,
    /// Referenced entity does not exist
    NotFound,
    /// Caller lacks permission
    Forbidden,
    /// Backend failure
    Internal,
}

impl TournamentError {
    /// Classify this error for transport mapping
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            TournamentNotFound(_) | MatchNotFound(_) | PlayerNotFound(_) | DeckNotFound(_)
            | NotRegistered(_) => ErrorKind::NotFound,
            AlreadyRegistered
            | TournamentFull { .. }
            | InvalidState { .. }
            | RoundAlreadyPaired { .. }
            | RoundNotCurrent { .. }
            | MatchAlreadyComplete
            | AlreadyDropped
            | AlreadyEnded(_) => ErrorKind::Conflict,
            InvalidCapacity { .. }
            | InsufficientPlayers { .. }
            | UnsupportedFormat(_)
            | ByeMatch
            | DeckListRequired
            | DeckFormatMismatch
            | IllegalDeck { .. }
            | DropsNotAllowed
            | UnregisterAfterStart => ErrorKind::Validation,
            NotAuthorized(_) => ErrorKind::Forbidden,
            Roster(_) | Storage(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
