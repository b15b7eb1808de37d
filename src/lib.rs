//! # Organized Play
//!
//! A tournament pairing and standings engine for competitive card play.
//!
//! The engine drives a tournament through its lifecycle: registration,
//! round pairing, match result processing, standings recomputation and
//! one-time placement awards at completion. Pairing supports Swiss (with
//! optional matchmaking oracle assistance), single and double elimination
//! and round robin schedules.
//!
//! ## Core Modules
//!
//! - [`tournament`]: The tournament aggregate, its manager and errors
//! - [`pairing`]: Per-format round pairing strategies
//! - [`standings`]: Pure standings recomputation from match history
//! - [`awards`]: Placement-based progression point awards
//! - [`matchmaking`]: Rating oracle interface for balanced pairings
//! - [`progression`]: Point ledger interface and in-memory ledger
//! - [`directory`]: Player and deck lookup interface
//! - [`store`]: Persistence interface and in-memory store
//! - [`config`]: Engine configuration
//!
//! ## Quick Example
//!
//! ```
//! use organized_play::tournament::models::{GameFormat, TournamentConfig, TournamentType};
//!
//! let config = TournamentConfig::swiss(
//!     "Weekly Standard".to_string(),
//!     GameFormat::Standard,
//!     16,
//! );
//! assert_eq!(config.tournament_type, TournamentType::Swiss);
//! assert_eq!(config.settings.max_players, 16);
//! ```

pub mod awards;
pub mod config;
pub mod directory;
pub mod matchmaking;
pub mod pairing;
pub mod progression;
pub mod standings;
pub mod store;
pub mod tournament;

pub use config::EngineConfig;
pub use tournament::manager::TournamentManager;
pub use tournament::models::{Match, Standing, Tournament};
