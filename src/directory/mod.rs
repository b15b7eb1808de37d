//! Roster directory interface.
//!
//! Registration validates players and decks against the deployment's user
//! and deck services through [`RosterDirectory`]. An in-memory roster is
//! provided for embedding and tests.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::tournament::models::{DeckId, GameFormat, PlayerId};
use std::collections::{HashMap, HashSet};

/// Deck metadata needed for registration checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckProfile {
    /// Deck ID
    pub deck_id: DeckId,
    /// Format the deck was built for
    pub format: GameFormat,
    /// Whether the deck passes format legality checks
    pub is_legal: bool,
}

/// Errors surfaced by a roster directory
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectoryError {
    /// Directory backend could not be reached or failed internally
    #[error("Roster directory unavailable: {0}")]
    Unavailable(String),
}

/// Result type for directory calls
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Player and deck lookup service
#[async_trait]
pub trait RosterDirectory: Send + Sync {
    /// Whether the player exists
    async fn player_exists(&self, player_id: PlayerId) -> DirectoryResult<bool>;

    /// Look up a deck's registration profile
    async fn find_deck(&self, deck_id: DeckId) -> DirectoryResult<Option<DeckProfile>>;
}

/// Roster directory backed by process memory
pub struct InMemoryRoster {
    players: RwLock<HashSet<PlayerId>>,
    decks: RwLock<HashMap<DeckId, DeckProfile>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashSet::new()),
            decks: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a known player
    pub async fn add_player(&self, player_id: PlayerId) {
        self.players.write().await.insert(player_id);
    }

    /// Seed a known deck
    pub async fn add_deck(&self, profile: DeckProfile) {
        self.decks.write().await.insert(profile.deck_id, profile);
    }
}

impl Default for InMemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterDirectory for InMemoryRoster {
    async fn player_exists(&self, player_id: PlayerId) -> DirectoryResult<bool> {
        Ok(self.players.read().await.contains(&player_id))
    }

    async fn find_deck(&self, deck_id: DeckId) -> DirectoryResult<Option<DeckProfile>> {
        Ok(self.decks.read().await.get(&deck_id).cloned())
    }
}
