//! Placement-based progression point awards.
//!
//! When a tournament completes, every finisher earns points in three
//! independent categories based on final position:
//!
//! | Position | Regional | Global | Format |
//! |----------|----------|--------|--------|
//! | 1        | 20       | 8      | 5      |
//! | 2        | 12       | 5      | 4      |
//! | 3-4      | 8        | 3      | 3      |
//! | 5-8      | 4        | 1      | 2      |
//! | 9+       | 1        | 0      | 0      |
//!
//! Awards run exactly once per tournament: the ledger is checked for
//! existing entries before anything is written.

use std::sync::Arc;

use crate::progression::{LedgerResult, PointLedger, PointType, PointUpdate};
use crate::tournament::models::{Standing, Tournament};

/// Points earned per category for one final position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementAward {
    pub regional: u32,
    pub global: u32,
    pub format: u32,
}

impl PlacementAward {
    /// Award bracket for a 1-based final position
    pub fn for_position(position: u32) -> Self {
        match position {
            1 => Self {
                regional: 20,
                global: 8,
                format: 5,
            },
            2 => Self {
                regional: 12,
                global: 5,
                format: 4,
            },
            3..=4 => Self {
                regional: 8,
                global: 3,
                format: 3,
            },
            5..=8 => Self {
                regional: 4,
                global: 1,
                format: 2,
            },
            _ => Self {
                regional: 1,
                global: 0,
                format: 0,
            },
        }
    }
}

/// Records placement points when a tournament completes
#[derive(Clone)]
pub struct CompletionAwarder {
    ledger: Arc<dyn PointLedger>,
}

impl CompletionAwarder {
    pub fn new(ledger: Arc<dyn PointLedger>) -> Self {
        Self { ledger }
    }

    /// Award placement points for the final standings
    ///
    /// Skips entirely when the tournament already has ledger entries.
    /// Awarding is best-effort per player: one player's failure is logged
    /// and the rest are still processed.
    pub async fn award(
        &self,
        tournament: &Tournament,
        standings: &[Standing],
    ) -> LedgerResult<()> {
        if self.ledger.has_event_awards(tournament.id).await? {
            log::info!(
                "Placement points already recorded for tournament {}, skipping",
                tournament.id
            );
            return Ok(());
        }

        let mut awarded = 0usize;
        for standing in standings {
            match self.award_player(tournament, standing).await {
                Ok(()) => awarded += 1,
                Err(err) => log::warn!(
                    "Failed to award placement points to player {} in tournament {}: {err}",
                    standing.player_id,
                    tournament.id
                ),
            }
        }
        log::info!(
            "Awarded placement points to {awarded} of {} players for tournament {}",
            standings.len(),
            tournament.id
        );
        Ok(())
    }

    async fn award_player(
        &self,
        tournament: &Tournament,
        standing: &Standing,
    ) -> LedgerResult<()> {
        let award = PlacementAward::for_position(standing.position);
        let entries = [
            (award.regional, PointType::Regional, None),
            (award.global, PointType::Global, None),
            (
                award.format,
                PointType::Format,
                Some(tournament.format.to_string()),
            ),
        ];
        for (points, point_type, format_key) in entries {
            if points == 0 {
                continue;
            }
            self.ledger
                .apply_point_update(PointUpdate {
                    user_id: standing.player_id,
                    event_id: tournament.id,
                    points,
                    point_type,
                    format_key,
                })
                .await?;
        }
        Ok(())
    }
}
