//! Progression point ledger interface.
//!
//! Completed tournaments award regional, global and format-specific
//! progression points. The engine records them through [`PointLedger`],
//! which a deployment backs with its progression service. An in-memory
//! implementation is provided for embedding and tests.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::tournament::models::{PlayerId, TournamentId};
use std::fmt;

/// Category a point award belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointType {
    /// Regional leaderboard points
    Regional,
    /// Global leaderboard points
    Global,
    /// Points in the tournament's game format
    Format,
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Regional => "regional",
            Self::Global => "global",
            Self::Format => "format",
        };
        write!(f, "{repr}")
    }
}

/// One point award to record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointUpdate {
    /// Player receiving the points
    pub user_id: PlayerId,
    /// Tournament the points were earned in
    pub event_id: TournamentId,
    /// Points awarded, always positive
    pub points: u32,
    /// Award category
    pub point_type: PointType,
    /// Game format key for format points
    pub format_key: Option<String>,
}

/// Errors surfaced by a point ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Ledger backend could not be reached or failed internally
    #[error("Point ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result type for ledger calls
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Progression point recording service
#[async_trait]
pub trait PointLedger: Send + Sync {
    /// Record one point award
    async fn apply_point_update(&self, update: PointUpdate) -> LedgerResult<()>;

    /// Whether any awards were already recorded for this event
    async fn has_event_awards(&self, event_id: TournamentId) -> LedgerResult<bool>;
}

/// Point ledger backed by process memory
pub struct InMemoryLedger {
    entries: RwLock<Vec<PointUpdate>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Seed an entry, useful for testing idempotency guards
    pub async fn with_entry(self, update: PointUpdate) -> Self {
        self.entries.write().await.push(update);
        self
    }

    /// All recorded entries in insertion order
    pub async fn entries(&self) -> Vec<PointUpdate> {
        self.entries.read().await.clone()
    }

    /// Entries recorded for one player
    pub async fn entries_for(&self, user_id: PlayerId) -> Vec<PointUpdate> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PointLedger for InMemoryLedger {
    async fn apply_point_update(&self, update: PointUpdate) -> LedgerResult<()> {
        self.entries.write().await.push(update);
        Ok(())
    }

    async fn has_event_awards(&self, event_id: TournamentId) -> LedgerResult<bool> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .any(|e| e.event_id == event_id))
    }
}
