//! Swiss Event Example
//!
//! Runs a complete seven-player Swiss tournament from registration to
//! final standings: rounds are paired, scripted results are reported and
//! completion awards are applied at the end.

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use uuid::Uuid;

use organized_play::config::EngineConfig;
use organized_play::directory::InMemoryRoster;
use organized_play::progression::InMemoryLedger;
use organized_play::store::InMemoryStore;
use organized_play::tournament::{
    GameFormat, MatchResult, MatchResultSubmission, TournamentConfig, TournamentManager,
    TournamentStatus,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Organized Play: Friday Night Modern ===\n");

    let roster = Arc::new(InMemoryRoster::new());
    let ledger = Arc::new(InMemoryLedger::new());
    let manager = TournamentManager::new(
        Arc::new(InMemoryStore::new()),
        roster.clone(),
        ledger.clone(),
        None,
        EngineConfig::default(),
    );

    // Register an odd field so every round hands out a bye
    let entrants = [
        "Avery", "Brooks", "Casey", "Devon", "Emerson", "Finley", "Greer",
    ];
    let mut players = Vec::new();
    for &name in &entrants {
        let player_id = Uuid::new_v4();
        roster.add_player(player_id).await;
        players.push((player_id, name));
    }
    let names: HashMap<Uuid, &str> = players.iter().copied().collect();

    let organizer = Uuid::new_v4();
    let config = TournamentConfig::swiss(
        "Friday Night Modern".to_string(),
        GameFormat::Modern,
        entrants.len(),
    );
    let tournament = manager.create_tournament(organizer, config).await?;
    manager.open_registration(tournament.id, organizer).await?;
    for &(player_id, name) in &players {
        manager
            .register_player(tournament.id, player_id, None)
            .await?;
        println!("Registered {name}");
    }
    manager.close_registration(tournament.id, organizer).await?;

    let mut tournament = manager.start_tournament(tournament.id, organizer).await?;
    println!("\nStarting {} rounds of Swiss\n", tournament.total_rounds);

    // Results are scripted; each player reports their own match
    let scripts: [(u32, u32, u32); 4] = [(2, 0, 0), (2, 1, 0), (0, 2, 0), (1, 1, 1)];
    let mut script_index = 0;
    while tournament.status == TournamentStatus::InProgress {
        let round = tournament.current_round;
        println!("--- Round {round} ---");

        let matches = manager.get_matches(tournament.id, Some(round)).await?;
        for m in &matches {
            if m.is_bye() {
                println!("  {} has the bye", names[&m.player1_id]);
                continue;
            }
            let (w1, w2, d) = scripts[script_index % scripts.len()];
            script_index += 1;
            let submission = MatchResultSubmission {
                player1_wins: w1,
                player2_wins: w2,
                draws: d,
                notes: None,
            };
            let reported = manager
                .submit_match_result(m.id, submission, m.player1_id)
                .await?;
            if let Some(p2) = reported.player2_id {
                match reported.result {
                    Some(MatchResult::Player1) => println!(
                        "  {} beat {} {}-{}",
                        names[&reported.player1_id], names[&p2], w1, w2
                    ),
                    Some(MatchResult::Player2) => println!(
                        "  {} beat {} {}-{}",
                        names[&p2], names[&reported.player1_id], w2, w1
                    ),
                    _ => println!(
                        "  {} drew {} {}-{}",
                        names[&reported.player1_id], names[&p2], w1, w2
                    ),
                }
            }
        }

        tournament = manager.get_tournament(tournament.id).await?;
        println!();
    }

    println!("=== Final Standings ===");
    println!(
        "{:<4} {:<10} {:>6} {:>7} {:>7}",
        "Pos", "Player", "Points", "Record", "GW%"
    );
    let standings = manager.get_standings(tournament.id).await?;
    for s in &standings {
        println!(
            "{:<4} {:<10} {:>6} {:>7} {:>6.1}%",
            s.position,
            names[&s.player_id],
            s.match_points,
            format!("{}-{}-{}", s.wins, s.losses, s.draws),
            s.game_win_percentage,
        );
    }

    let stats = manager.get_statistics(tournament.id).await?;
    println!(
        "\n{} matches played over {} rounds",
        stats.completed_matches, stats.completed_rounds
    );
    if let Some(minutes) = stats.average_match_minutes {
        println!("Average match length: {minutes:.1} minutes");
    }

    println!("\n=== Points Awarded ===");
    for entry in ledger.entries().await {
        let scope = match &entry.format_key {
            Some(format) => format!("{} {}", format, entry.point_type),
            None => entry.point_type.to_string(),
        };
        println!("  {:<10} +{:<3} {}", names[&entry.user_id], entry.points, scope);
    }

    Ok(())
}
