//! Tournament organization and play.
//!
//! This module provides tournament management functionality including:
//! - Tournament creation and lifecycle control
//! - Player registration with deck validation
//! - Round pairing across Swiss, elimination and round robin formats
//! - Match result processing and standings
//! - Placement point awards on completion
//!
//! ## Example
//!
//! ```no_run
//! use organized_play::config::EngineConfig;
//! use organized_play::directory::InMemoryRoster;
//! use organized_play::progression::InMemoryLedger;
//! use organized_play::store::InMemoryStore;
//! use organized_play::tournament::models::GameFormat;
//! use organized_play::tournament::{TournamentConfig, TournamentManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(
//!         Arc::new(InMemoryStore::new()),
//!         Arc::new(InMemoryRoster::new()),
//!         Arc::new(InMemoryLedger::new()),
//!         None,
//!         EngineConfig::default(),
//!     );
//!
//!     // An eight-player Swiss event
//!     let organizer = uuid::Uuid::new_v4();
//!     let config = TournamentConfig::swiss(
//!         "Friday Night Modern".to_string(),
//!         GameFormat::Modern,
//!         8,
//!     );
//!
//!     let tournament = manager.create_tournament(organizer, config).await?;
//!     manager.open_registration(tournament.id, organizer).await?;
//!     println!("Created tournament: {}", tournament.id);
//!
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ErrorKind, TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    GameFormat, Match, MatchResult, MatchResultSubmission, Standing, Tournament,
    TournamentConfig, TournamentId, TournamentSettings, TournamentStatistics, TournamentStatus,
    TournamentType,
};
