//! Standings computation.
//!
//! Standings are a pure projection of completed match results. This module
//! recomputes every row from scratch each time rather than applying deltas,
//! so a resubmitted or corrected history always yields consistent totals.
//!
//! Match points award 3 per win (byes count as wins) and 1 per draw. Game
//! points award 3 per game win, with a bye scored as a 2-0 sweep. Rows are
//! ranked by match points, then game-win percentage; ties beyond that keep
//! their prior relative order.

use crate::tournament::models::{Match, MatchResult, PlayerId, Standing};

/// Per-player record accumulated from completed matches
#[derive(Debug, Default)]
struct PlayerRecord {
    wins: u32,
    losses: u32,
    draws: u32,
    game_wins: u32,
    game_losses: u32,
}

impl PlayerRecord {
    fn from_matches(player_id: PlayerId, matches: &[Match]) -> Self {
        let mut record = Self::default();
        for m in matches {
            if !m.is_complete || !m.involves(player_id) {
                continue;
            }
            if m.is_bye() {
                // A bye scores as a 2-0 match win
                record.wins += 1;
                record.game_wins += 2;
                continue;
            }
            match m.result {
                Some(MatchResult::Draw) => {
                    record.draws += 1;
                    record.game_wins += m.draws;
                    record.game_losses += m.draws;
                }
                Some(MatchResult::Player1) | Some(MatchResult::Player2) => {
                    let (own_games, opponent_games) = if m.player1_id == player_id {
                        (m.player1_wins, m.player2_wins)
                    } else {
                        (m.player2_wins, m.player1_wins)
                    };
                    if own_games > opponent_games {
                        record.wins += 1;
                    } else {
                        record.losses += 1;
                    }
                    record.game_wins += own_games;
                    record.game_losses += opponent_games;
                }
                _ => {}
            }
        }
        record
    }

    fn match_points(&self) -> u32 {
        self.wins * 3 + self.draws
    }

    fn game_win_percentage(&self) -> f64 {
        let total = self.game_wins + self.game_losses;
        if total == 0 {
            0.0
        } else {
            f64::from(self.game_wins) / f64::from(total) * 100.0
        }
    }
}

/// Recompute every standing row from the given match history
///
/// Rewrites record fields and positions in place. Drop status and the
/// carried opponent percentages are left untouched. The sort is stable,
/// so rows tied on both ranking keys keep their registration order.
pub fn recompute(matches: &[Match], standings: &mut [Standing]) {
    for standing in standings.iter_mut() {
        let record = PlayerRecord::from_matches(standing.player_id, matches);
        standing.wins = record.wins;
        standing.losses = record.losses;
        standing.draws = record.draws;
        standing.match_points = record.match_points();
        standing.game_points = record.game_wins * 3;
        standing.game_win_percentage = record.game_win_percentage();
    }

    standings.sort_by(|a, b| {
        b.match_points.cmp(&a.match_points).then_with(|| {
            b.game_win_percentage.total_cmp(&a.game_win_percentage)
        })
    });

    for (index, standing) in standings.iter_mut().enumerate() {
        standing.position = index as u32 + 1;
    }
}
