//! Integration tests for the tournament engine
//!
//! These tests drive whole tournaments through the public manager API:
//! registration, pairing, result submission, standings, lifecycle control
//! and completion awards, across all supported formats.

#[cfg(test)]
mod engine_tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use uuid::Uuid;

    use organized_play::config::EngineConfig;
    use organized_play::directory::{DeckProfile, InMemoryRoster};
    use organized_play::matchmaking::{
        OracleError, OracleResult, PairingSuggestion, PlayerRating, RankedOutcome, RatingOracle,
    };
    use organized_play::progression::{InMemoryLedger, PointType};
    use organized_play::store::InMemoryStore;
    use organized_play::tournament::models::{
        BalanceCategory, MatchId, MatchQuality, PlayerId, TournamentId,
    };
    use organized_play::tournament::{
        ErrorKind, GameFormat, Match, MatchResult, MatchResultSubmission, Standing, Tournament,
        TournamentConfig, TournamentError, TournamentManager, TournamentSettings,
        TournamentStatus, TournamentType,
    };

    #[tokio::test]
    async fn test_full_swiss_lifecycle_to_completion() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config =
            TournamentConfig::swiss("Friday Night Modern".to_string(), GameFormat::Modern, 4);
        let t = ready_tournament(&h, config, &players).await;

        let t = h.manager.start_tournament(t.id, h.organizer).await.unwrap();
        assert_eq!(t.status, TournamentStatus::InProgress);
        assert_eq!(t.current_round, 1);
        assert_eq!(t.total_rounds, 2);
        assert!(t.started_at.is_some());

        // Round 1 pairs in registration order, everyone being tied on zero
        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 2);
        assert_eq!(round1[0].player1_id, players[0]);
        assert_eq!(round1[0].player2_id, Some(players[1]));
        assert_eq!(round1[1].player1_id, players[2]);
        assert_eq!(round1[1].player2_id, Some(players[3]));
        submit_result(&h.manager, &round1[0], (2, 0, 0)).await;
        submit_result(&h.manager, &round1[1], (2, 1, 0)).await;

        // Finishing round 1 pairs round 2 with the winners on top
        let round2 = h.manager.get_matches(t.id, Some(2)).await.unwrap();
        assert_eq!(round2.len(), 2);
        assert_eq!(round2[0].player1_id, players[0]);
        assert_eq!(round2[0].player2_id, Some(players[2]));
        assert_eq!(round2[1].player1_id, players[1]);
        assert_eq!(round2[1].player2_id, Some(players[3]));
        submit_result(&h.manager, &round2[0], (2, 1, 0)).await;
        submit_result(&h.manager, &round2[1], (0, 2, 0)).await;

        let t = h.manager.get_tournament(t.id).await.unwrap();
        assert_eq!(t.status, TournamentStatus::Completed);
        assert!(t.ended_at.is_some());

        let standings = h.manager.get_standings(t.id).await.unwrap();
        assert_eq!(standings.len(), 4);
        let order: Vec<PlayerId> = standings.iter().map(|s| s.player_id).collect();
        assert_eq!(order, vec![players[0], players[3], players[2], players[1]]);
        assert_eq!(
            standings.iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(standings[0].match_points, 6);
        assert_eq!(standings[0].wins, 2);
        assert!((standings[0].game_win_percentage - 80.0).abs() < 1e-9);
        assert_eq!(standings[1].match_points, 3);
        assert!((standings[1].game_win_percentage - 60.0).abs() < 1e-9);
        assert_eq!(standings[2].match_points, 3);
        assert!((standings[2].game_win_percentage - 50.0).abs() < 1e-9);
        assert_eq!(standings[3].match_points, 0);

        // Every finisher earned points in all three categories
        assert_eq!(h.ledger.entries().await.len(), 12);
        let winner = h.ledger.entries_for(players[0]).await;
        assert!(winner
            .iter()
            .any(|e| e.point_type == PointType::Regional && e.points == 20));
        assert!(winner
            .iter()
            .any(|e| e.point_type == PointType::Global && e.points == 8));
        assert!(winner.iter().any(|e| e.point_type == PointType::Format
            && e.points == 5
            && e.format_key.as_deref() == Some("Modern")));
    }

    #[tokio::test]
    async fn test_odd_pool_gets_a_bye() {
        let h = harness();
        let players = roster_players(&h, 5).await;
        let config = TournamentConfig::swiss("Draft League".to_string(), GameFormat::Draft, 8);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 3);
        let bye = &round1[2];
        assert!(bye.is_bye());
        assert!(bye.is_complete);
        assert_eq!(bye.player1_id, players[4]);
        assert_eq!(bye.result, Some(MatchResult::Bye));

        // The bye scores as a 2-0 win before any submissions come in
        let standings = h.manager.get_standings(t.id).await.unwrap();
        assert_eq!(standings[0].player_id, players[4]);
        assert_eq!(standings[0].position, 1);
        assert_eq!(standings[0].match_points, 3);
        assert_eq!(standings[0].game_points, 6);
        assert!((standings[0].game_win_percentage - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_resubmission_is_rejected() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config =
            TournamentConfig::swiss("Weekly Standard".to_string(), GameFormat::Standard, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        submit_result(&h.manager, &round1[0], (2, 0, 0)).await;

        let err = h
            .manager
            .submit_match_result(
                round1[0].id,
                MatchResultSubmission {
                    player1_wins: 0,
                    player2_wins: 2,
                    draws: 0,
                    notes: None,
                },
                round1[0].player1_id,
            )
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::MatchAlreadyComplete);
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // The original result stands
        let standings = h.manager.get_standings(t.id).await.unwrap();
        let winner = standing_for(&standings, round1[0].player1_id);
        assert_eq!(winner.match_points, 3);
        assert_eq!(winner.wins, 1);
    }

    #[tokio::test]
    async fn test_dropped_player_excluded_from_pairings() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Pauper Night".to_string(), GameFormat::Pauper, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        submit_result(&h.manager, &round1[0], (2, 0, 0)).await;

        let standing = h
            .manager
            .drop_player(t.id, players[3], players[3])
            .await
            .unwrap();
        assert!(standing.has_dropped);
        assert_eq!(standing.dropped_in_round, Some(1));

        // Finishing round 1 pairs round 2 without the dropped player
        submit_result(&h.manager, &round1[1], (2, 0, 0)).await;
        let round2 = h.manager.get_matches(t.id, Some(2)).await.unwrap();
        assert_eq!(round2.len(), 2);
        assert_eq!(round2[0].player1_id, players[0]);
        assert_eq!(round2[0].player2_id, Some(players[2]));
        assert!(round2[1].is_bye());
        assert_eq!(round2[1].player1_id, players[1]);
    }

    #[tokio::test]
    async fn test_registration_guards() {
        let h = harness();
        let players = roster_players(&h, 3).await;
        let config = TournamentConfig::swiss("Two Seats".to_string(), GameFormat::Classic, 2);
        let t = h
            .manager
            .create_tournament(h.organizer, config)
            .await
            .unwrap();

        // Registration has not opened yet
        let err = h
            .manager
            .register_player(t.id, players[0], None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::InvalidState {
                expected: TournamentStatus::RegistrationOpen,
                actual: TournamentStatus::Scheduled,
            }
        );

        h.manager
            .open_registration(t.id, h.organizer)
            .await
            .unwrap();
        h.manager
            .register_player(t.id, players[0], None)
            .await
            .unwrap();

        let err = h
            .manager
            .register_player(t.id, players[0], None)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::AlreadyRegistered);
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let unknown = Uuid::new_v4();
        let err = h
            .manager
            .register_player(t.id, unknown, None)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::PlayerNotFound(unknown));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        h.manager
            .register_player(t.id, players[1], None)
            .await
            .unwrap();
        let err = h
            .manager
            .register_player(t.id, players[2], None)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::TournamentFull { max_players: 2 });

        // Capacity settings must admit at least two players
        let bad = TournamentConfig::swiss("Overbooked".to_string(), GameFormat::Classic, 4)
            .with_settings(TournamentSettings {
                min_players: 5,
                max_players: 4,
                ..TournamentSettings::default()
            });
        let err = h
            .manager
            .create_tournament(h.organizer, bad)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::InvalidCapacity {
                min_players: 5,
                max_players: 4,
            }
        );
    }

    #[tokio::test]
    async fn test_deck_validation_on_registration() {
        let h = harness();
        let players = roster_players(&h, 2).await;
        let config =
            TournamentConfig::swiss("Modern Showdown".to_string(), GameFormat::Modern, 4)
                .with_settings(TournamentSettings {
                    max_players: 4,
                    require_deck_list: true,
                    ..TournamentSettings::default()
                });
        let t = h
            .manager
            .create_tournament(h.organizer, config)
            .await
            .unwrap();
        h.manager
            .open_registration(t.id, h.organizer)
            .await
            .unwrap();

        let err = h
            .manager
            .register_player(t.id, players[0], None)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::DeckListRequired);

        let missing = Uuid::new_v4();
        let err = h
            .manager
            .register_player(t.id, players[0], Some(missing))
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::DeckNotFound(missing));

        let off_format = Uuid::new_v4();
        h.roster
            .add_deck(DeckProfile {
                deck_id: off_format,
                format: GameFormat::Standard,
                is_legal: true,
            })
            .await;
        let err = h
            .manager
            .register_player(t.id, players[0], Some(off_format))
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::DeckFormatMismatch);

        let banned = Uuid::new_v4();
        h.roster
            .add_deck(DeckProfile {
                deck_id: banned,
                format: GameFormat::Modern,
                is_legal: false,
            })
            .await;
        let err = h
            .manager
            .register_player(t.id, players[0], Some(banned))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::IllegalDeck {
                deck_id: banned,
                format: GameFormat::Modern,
            }
        );

        // Legal decks register and are carried onto the pairings
        let decks: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        for &deck_id in &decks {
            h.roster
                .add_deck(DeckProfile {
                    deck_id,
                    format: GameFormat::Modern,
                    is_legal: true,
                })
                .await;
        }
        h.manager
            .register_player(t.id, players[0], Some(decks[0]))
            .await
            .unwrap();
        h.manager
            .register_player(t.id, players[1], Some(decks[1]))
            .await
            .unwrap();
        h.manager
            .close_registration(t.id, h.organizer)
            .await
            .unwrap();
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1[0].player1_deck_id, Some(decks[0]));
        assert_eq!(round1[0].player2_deck_id, Some(decks[1]));
    }

    #[tokio::test]
    async fn test_start_requires_valid_preconditions() {
        let h = harness();
        let players = roster_players(&h, 2).await;
        let config = TournamentConfig::swiss("Legacy Clash".to_string(), GameFormat::Legacy, 4);
        let t = h
            .manager
            .create_tournament(h.organizer, config)
            .await
            .unwrap();
        h.manager
            .open_registration(t.id, h.organizer)
            .await
            .unwrap();
        h.manager
            .register_player(t.id, players[0], None)
            .await
            .unwrap();

        // Registration must be closed first
        let err = h
            .manager
            .start_tournament(t.id, h.organizer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::InvalidState {
                expected: TournamentStatus::RegistrationClosed,
                actual: TournamentStatus::RegistrationOpen,
            }
        );

        h.manager
            .close_registration(t.id, h.organizer)
            .await
            .unwrap();
        let err = h
            .manager
            .start_tournament(t.id, h.organizer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::InsufficientPlayers {
                needed: 2,
                current: 1,
            }
        );

        let err = h
            .manager
            .start_tournament(t.id, players[0])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::NotAuthorized(players[0]));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_formats_without_pairing_cannot_start() {
        let h = harness();
        let players = roster_players(&h, 2).await;
        let config = TournamentConfig::swiss("Sealed League".to_string(), GameFormat::Sealed, 8)
            .with_type(TournamentType::SealedDeck);
        let t = ready_tournament(&h, config, &players).await;

        let err = h
            .manager
            .start_tournament(t.id, h.organizer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::UnsupportedFormat(TournamentType::SealedDeck)
        );

        // The failed start left no trace
        let t = h.manager.get_tournament(t.id).await.unwrap();
        assert_eq!(t.status, TournamentStatus::RegistrationClosed);
        assert_eq!(t.current_round, 0);
        assert!(t.started_at.is_none());
        assert!(h.manager.get_matches(t.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregistration_before_start() {
        let h = harness();
        let players = roster_players(&h, 3).await;
        let config =
            TournamentConfig::swiss("Commander Pod".to_string(), GameFormat::Commander, 8);
        let t = h
            .manager
            .create_tournament(h.organizer, config)
            .await
            .unwrap();
        h.manager
            .open_registration(t.id, h.organizer)
            .await
            .unwrap();
        for &p in &players {
            h.manager.register_player(t.id, p, None).await.unwrap();
        }

        // Self-withdrawal removes the participant and the standing row
        let t2 = h
            .manager
            .unregister_player(t.id, players[1], players[1])
            .await
            .unwrap();
        assert_eq!(t2.participants.len(), 2);
        let standings = h.manager.get_standings(t.id).await.unwrap();
        assert_eq!(standings.len(), 2);
        assert!(standings.iter().all(|s| s.player_id != players[1]));

        let err = h
            .manager
            .unregister_player(t.id, players[1], players[1])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::NotRegistered(players[1]));

        // Another player cannot withdraw someone else, the organizer can
        let err = h
            .manager
            .unregister_player(t.id, players[0], players[2])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::NotAuthorized(players[2]));
        h.manager
            .unregister_player(t.id, players[2], h.organizer)
            .await
            .unwrap();

        // Refill the field and start; withdrawal is no longer possible
        h.manager
            .register_player(t.id, players[1], None)
            .await
            .unwrap();
        h.manager
            .register_player(t.id, players[2], None)
            .await
            .unwrap();
        h.manager
            .close_registration(t.id, h.organizer)
            .await
            .unwrap();
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();
        let err = h
            .manager
            .unregister_player(t.id, players[0], players[0])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::UnregisterAfterStart);
    }

    #[tokio::test]
    async fn test_drop_guards() {
        let h = harness();
        let players = roster_players(&h, 4).await;

        // Drops disabled by settings
        let config = TournamentConfig::swiss("No Drops".to_string(), GameFormat::Standard, 4)
            .with_settings(TournamentSettings {
                max_players: 4,
                allow_drops: false,
                ..TournamentSettings::default()
            });
        let locked = ready_tournament(&h, config, &players).await;
        h.manager
            .start_tournament(locked.id, h.organizer)
            .await
            .unwrap();
        let err = h
            .manager
            .drop_player(locked.id, players[0], players[0])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::DropsNotAllowed);

        // Standard drop flow
        let config = TournamentConfig::swiss("Open Swiss".to_string(), GameFormat::Standard, 8);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let err = h
            .manager
            .drop_player(t.id, players[0], players[1])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::NotAuthorized(players[1]));

        h.manager
            .drop_player(t.id, players[0], players[0])
            .await
            .unwrap();
        let err = h
            .manager
            .drop_player(t.id, players[0], players[0])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::AlreadyDropped);

        // The organizer may drop a player on their behalf
        let standing = h
            .manager
            .drop_player(t.id, players[1], h.organizer)
            .await
            .unwrap();
        assert!(standing.has_dropped);

        // Nothing to drop once the tournament has ended
        let config = TournamentConfig::swiss("Quick Final".to_string(), GameFormat::Standard, 2);
        let quick = ready_tournament(&h, config, &players[..2]).await;
        h.manager
            .start_tournament(quick.id, h.organizer)
            .await
            .unwrap();
        let round1 = h.manager.get_matches(quick.id, Some(1)).await.unwrap();
        submit_result(&h.manager, &round1[0], (2, 0, 0)).await;
        let err = h
            .manager
            .drop_player(quick.id, players[0], players[0])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::AlreadyEnded(TournamentStatus::Completed)
        );
    }

    #[tokio::test]
    async fn test_pause_resume_and_cancel() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Stop and Go".to_string(), GameFormat::Standard, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        // Only the organizer can pause
        let err = h
            .manager
            .pause_tournament(t.id, players[0])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::NotAuthorized(players[0]));

        let t2 = h
            .manager
            .pause_tournament(t.id, h.organizer)
            .await
            .unwrap();
        assert_eq!(t2.status, TournamentStatus::Paused);

        // No results while paused
        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        let err = h
            .manager
            .submit_match_result(
                round1[0].id,
                MatchResultSubmission {
                    player1_wins: 2,
                    player2_wins: 0,
                    draws: 0,
                    notes: None,
                },
                round1[0].player1_id,
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::InvalidState {
                expected: TournamentStatus::InProgress,
                actual: TournamentStatus::Paused,
            }
        );

        let t2 = h
            .manager
            .resume_tournament(t.id, h.organizer)
            .await
            .unwrap();
        assert_eq!(t2.status, TournamentStatus::InProgress);
        submit_result(&h.manager, &round1[0], (2, 0, 0)).await;

        let t2 = h
            .manager
            .cancel_tournament(t.id, h.organizer)
            .await
            .unwrap();
        assert_eq!(t2.status, TournamentStatus::Cancelled);
        assert!(t2.ended_at.is_some());

        let err = h
            .manager
            .register_player(t.id, players[0], None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::InvalidState {
                expected: TournamentStatus::RegistrationOpen,
                actual: TournamentStatus::Cancelled,
            }
        );

        let err = h
            .manager
            .cancel_tournament(t.id, h.organizer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::AlreadyEnded(TournamentStatus::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_statistics_reflect_progress() {
        let h = harness();
        let players = roster_players(&h, 5).await;
        let config = TournamentConfig::swiss("Stats Night".to_string(), GameFormat::Standard, 8);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        // Byes complete instantly but never count toward the average duration
        let stats = h.manager.get_statistics(t.id).await.unwrap();
        assert_eq!(stats.total_players, 5);
        assert_eq!(stats.completed_rounds, 1);
        assert_eq!(stats.total_matches, 3);
        assert_eq!(stats.completed_matches, 1);
        assert_eq!(stats.average_match_minutes, None);
        assert_eq!(stats.top_standings.len(), 5);
        assert_eq!(stats.top_standings[0].player_id, players[4]);

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        submit_result(&h.manager, &round1[0], (2, 1, 0)).await;

        let stats = h.manager.get_statistics(t.id).await.unwrap();
        assert_eq!(stats.completed_matches, 2);
        let minutes = stats.average_match_minutes.unwrap();
        assert!(minutes >= 0.0);
        assert!(minutes < 1.0);
    }

    #[tokio::test]
    async fn test_oracle_suggestions_shape_round_one() {
        let players: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let oracle = Arc::new(ScriptedOracle::new().with_suggestions(vec![
            PairingSuggestion {
                players: (players[3], players[0]),
                quality: quality(0.9),
            },
            PairingSuggestion {
                players: (players[1], players[2]),
                quality: quality(0.5),
            },
        ]));
        let h = harness_with_oracle(Some(oracle));
        for &p in &players {
            h.roster.add_player(p).await;
        }
        let config =
            TournamentConfig::swiss("Ranked Standard".to_string(), GameFormat::Standard, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 2);
        assert_eq!(round1[0].player1_id, players[3]);
        assert_eq!(round1[0].player2_id, Some(players[0]));
        let q = round1[0].quality.as_ref().unwrap();
        assert!((q.score - 0.9).abs() < 1e-9);
        assert_eq!(q.balance_category, BalanceCategory::Excellent);
        assert_eq!(round1[1].player1_id, players[1]);
        assert_eq!(
            round1[1].quality.as_ref().unwrap().balance_category,
            BalanceCategory::Fair
        );
    }

    #[tokio::test]
    async fn test_oracle_assigns_bye_to_lowest_rated() {
        let players: Vec<PlayerId> = (0..3).map(|_| Uuid::new_v4()).collect();
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_rating(players[0], 24.1)
                .with_rating(players[1], 3.2)
                .with_rating(players[2], 17.8)
                .with_suggestions(vec![PairingSuggestion {
                    players: (players[0], players[2]),
                    quality: quality(0.7),
                }]),
        );
        let h = harness_with_oracle(Some(oracle));
        for &p in &players {
            h.roster.add_player(p).await;
        }
        let config = TournamentConfig::swiss("Ranked Trio".to_string(), GameFormat::Standard, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 2);
        assert_eq!(round1[0].player1_id, players[0]);
        assert_eq!(round1[0].player2_id, Some(players[2]));
        assert!(round1[1].is_bye());
        assert_eq!(round1[1].player1_id, players[1]);
    }

    #[tokio::test]
    async fn test_oracle_failure_falls_back_to_deterministic_pairing() {
        let h = harness_with_oracle(Some(Arc::new(ScriptedOracle::new().failing())));
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Ranked Modern".to_string(), GameFormat::Modern, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 2);
        assert_eq!(round1[0].player1_id, players[0]);
        assert_eq!(round1[0].player2_id, Some(players[1]));
        assert!(round1.iter().all(|m| m.quality.is_none()));
    }

    #[tokio::test]
    async fn test_malformed_oracle_response_falls_back() {
        let players: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        // One pair for a four-player pool leaves two players unpaired
        let oracle = Arc::new(ScriptedOracle::new().with_suggestions(vec![PairingSuggestion {
            players: (players[0], players[1]),
            quality: quality(0.8),
        }]));
        let h = harness_with_oracle(Some(oracle));
        for &p in &players {
            h.roster.add_player(p).await;
        }
        let config = TournamentConfig::swiss("Ranked Legacy".to_string(), GameFormat::Legacy, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 2);
        assert!(round1.iter().all(|m| m.quality.is_none()));
    }

    #[tokio::test]
    async fn test_completed_matches_update_ratings() {
        let oracle = Arc::new(ScriptedOracle::new());
        let h = harness_with_oracle(Some(oracle.clone()));
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Rated Pauper".to_string(), GameFormat::Pauper, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();
        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();

        submit_result(&h.manager, &round1[0], (0, 2, 0)).await;
        submit_result(&h.manager, &round1[1], (1, 1, 1)).await;

        let updates = oracle.recorded_updates();
        assert_eq!(updates.len(), 2);

        // Decisive result ranks the winner first
        let decisive = &updates[0];
        assert_eq!(decisive.format_key, "Pauper");
        assert_eq!(decisive.tournament_id, t.id);
        assert_eq!(decisive.match_id, round1[0].id);
        assert_eq!(
            decisive.outcomes,
            vec![
                RankedOutcome {
                    player_id: players[1],
                    rank: 1,
                },
                RankedOutcome {
                    player_id: players[0],
                    rank: 2,
                },
            ]
        );

        // A draw reports both players at rank one
        let draw = &updates[1];
        assert_eq!(
            draw.outcomes,
            vec![
                RankedOutcome {
                    player_id: players[2],
                    rank: 1,
                },
                RankedOutcome {
                    player_id: players[3],
                    rank: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_round_robin_plays_every_pair() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Club League".to_string(), GameFormat::Classic, 4)
            .with_type(TournamentType::RoundRobin);
        let t = ready_tournament(&h, config, &players).await;
        let t = h.manager.start_tournament(t.id, h.organizer).await.unwrap();
        assert_eq!(t.total_rounds, 3);

        for round in 1..=3 {
            let matches = h.manager.get_matches(t.id, Some(round)).await.unwrap();
            assert_eq!(matches.len(), 2);
            for m in &matches {
                submit_result(&h.manager, m, (2, 0, 0)).await;
            }
        }

        let t = h.manager.get_tournament(t.id).await.unwrap();
        assert_eq!(t.status, TournamentStatus::Completed);

        // Every pair of players met exactly once
        let all = h.manager.get_matches(t.id, None).await.unwrap();
        assert_eq!(all.len(), 6);
        let mut pairs = HashSet::new();
        for m in &all {
            let p2 = m.player2_id.unwrap();
            let key = if m.player1_id < p2 {
                (m.player1_id, p2)
            } else {
                (p2, m.player1_id)
            };
            assert!(pairs.insert(key), "pair repeated across rounds");
        }
        assert_eq!(pairs.len(), 6);
    }

    #[tokio::test]
    async fn test_single_elimination_bracket_runs_to_a_final() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Title Cup".to_string(), GameFormat::Standard, 4)
            .with_type(TournamentType::SingleElimination);
        let t = ready_tournament(&h, config, &players).await;
        let t = h.manager.start_tournament(t.id, h.organizer).await.unwrap();
        assert_eq!(t.total_rounds, 2);

        // Seeding sends the top seed against the bottom seed
        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 2);
        assert_eq!(round1[0].player1_id, players[0]);
        assert_eq!(round1[0].player2_id, Some(players[3]));
        assert_eq!(round1[1].player1_id, players[1]);
        assert_eq!(round1[1].player2_id, Some(players[2]));

        submit_result(&h.manager, &round1[0], (0, 2, 0)).await;
        submit_result(&h.manager, &round1[1], (2, 0, 0)).await;

        let final_round = h.manager.get_matches(t.id, Some(2)).await.unwrap();
        assert_eq!(final_round.len(), 1);
        assert_eq!(final_round[0].player1_id, players[3]);
        assert_eq!(final_round[0].player2_id, Some(players[1]));
        submit_result(&h.manager, &final_round[0], (0, 2, 0)).await;

        let t = h.manager.get_tournament(t.id).await.unwrap();
        assert_eq!(t.status, TournamentStatus::Completed);
        let standings = h.manager.get_standings(t.id).await.unwrap();
        let order: Vec<PlayerId> = standings.iter().map(|s| s.player_id).collect();
        assert_eq!(order, vec![players[1], players[3], players[0], players[2]]);
    }

    #[tokio::test]
    async fn test_double_elimination_runs_upper_and_lower_brackets() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config =
            TournamentConfig::swiss("Redemption Cup".to_string(), GameFormat::Standard, 4)
                .with_type(TournamentType::DoubleElimination);
        let t = ready_tournament(&h, config, &players).await;
        let t = h.manager.start_tournament(t.id, h.organizer).await.unwrap();
        assert_eq!(t.total_rounds, 4);

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        assert_eq!(round1.len(), 2);
        submit_result(&h.manager, &round1[0], (2, 0, 0)).await;
        submit_result(&h.manager, &round1[1], (2, 0, 0)).await;

        // Winners meet in the upper bracket, losers fight for survival
        let round2 = h.manager.get_matches(t.id, Some(2)).await.unwrap();
        assert_eq!(round2.len(), 2);
        assert_eq!(round2[0].player1_id, players[0]);
        assert_eq!(round2[0].player2_id, Some(players[2]));
        assert_eq!(round2[1].player1_id, players[1]);
        assert_eq!(round2[1].player2_id, Some(players[3]));
        submit_result(&h.manager, &round2[0], (2, 0, 0)).await;
        submit_result(&h.manager, &round2[1], (2, 0, 0)).await;

        // The unbeaten leader sits out while the lower bracket resolves
        let round3 = h.manager.get_matches(t.id, Some(3)).await.unwrap();
        assert_eq!(round3.len(), 2);
        assert_eq!(round3[0].player1_id, players[1]);
        assert_eq!(round3[0].player2_id, Some(players[2]));
        assert!(round3[1].is_bye());
        assert_eq!(round3[1].player1_id, players[0]);
        submit_result(&h.manager, &round3[0], (2, 0, 0)).await;

        let grand_final = h.manager.get_matches(t.id, Some(4)).await.unwrap();
        assert_eq!(grand_final.len(), 1);
        assert_eq!(grand_final[0].player1_id, players[0]);
        assert_eq!(grand_final[0].player2_id, Some(players[1]));
        submit_result(&h.manager, &grand_final[0], (2, 0, 0)).await;

        let t = h.manager.get_tournament(t.id).await.unwrap();
        assert_eq!(t.status, TournamentStatus::Completed);
        let standings = h.manager.get_standings(t.id).await.unwrap();
        assert_eq!(standings[0].player_id, players[0]);
        assert_eq!(standings[0].match_points, 12);
        let champion = h.ledger.entries_for(players[0]).await;
        assert!(champion
            .iter()
            .any(|e| e.point_type == PointType::Regional && e.points == 20));
    }

    #[tokio::test]
    async fn test_generate_pairings_guards() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Replay Guard".to_string(), GameFormat::Standard, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let err = h
            .manager
            .generate_pairings(t.id, 2, h.organizer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TournamentError::RoundNotCurrent {
                requested: 2,
                current: 1,
            }
        );

        let err = h
            .manager
            .generate_pairings(t.id, 1, h.organizer)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::RoundAlreadyPaired { round: 1 });
    }

    #[tokio::test]
    async fn test_judges_and_organizers_can_submit() {
        let h = harness();
        let players = roster_players(&h, 4).await;
        let config = TournamentConfig::swiss("Judged Event".to_string(), GameFormat::Standard, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();
        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();

        // A bystander cannot report someone else's match
        let stranger = Uuid::new_v4();
        let err = h
            .manager
            .submit_match_result(round1[0].id, MatchResultSubmission::default(), stranger)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::NotAuthorized(stranger));

        // An assigned judge can, and only the organizer assigns judges
        let judge = Uuid::new_v4();
        let err = h
            .manager
            .assign_judge(round1[0].id, judge, players[0])
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::NotAuthorized(players[0]));
        let m = h
            .manager
            .assign_judge(round1[0].id, judge, h.organizer)
            .await
            .unwrap();
        assert_eq!(m.judge_id, Some(judge));
        let m = h
            .manager
            .submit_match_result(
                round1[0].id,
                MatchResultSubmission {
                    player1_wins: 2,
                    player2_wins: 1,
                    draws: 0,
                    notes: Some("Table 1 ruling".to_string()),
                },
                judge,
            )
            .await
            .unwrap();
        assert!(m.is_complete);
        assert_eq!(m.result, Some(MatchResult::Player1));
        assert_eq!(m.notes.as_deref(), Some("Table 1 ruling"));

        // The organizer can report any match directly
        let m = h
            .manager
            .submit_match_result(
                round1[1].id,
                MatchResultSubmission {
                    player1_wins: 0,
                    player2_wins: 2,
                    draws: 0,
                    notes: None,
                },
                h.organizer,
            )
            .await
            .unwrap();
        assert!(m.is_complete);
    }

    #[tokio::test]
    async fn test_bye_match_rejects_submissions() {
        let h = harness();
        let players = roster_players(&h, 3).await;
        let config = TournamentConfig::swiss("Trio Night".to_string(), GameFormat::Standard, 4);
        let t = ready_tournament(&h, config, &players).await;
        h.manager.start_tournament(t.id, h.organizer).await.unwrap();

        let round1 = h.manager.get_matches(t.id, Some(1)).await.unwrap();
        let bye = round1.iter().find(|m| m.is_bye()).unwrap();
        let err = h
            .manager
            .submit_match_result(bye.id, MatchResultSubmission::default(), bye.player1_id)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::ByeMatch);
    }

    #[tokio::test]
    async fn test_lookup_and_listing() {
        let h = harness();

        let missing = Uuid::new_v4();
        let err = h.manager.get_tournament(missing).await.unwrap_err();
        assert_eq!(err, TournamentError::TournamentNotFound(missing));

        let err = h
            .manager
            .submit_match_result(missing, MatchResultSubmission::default(), h.organizer)
            .await
            .unwrap_err();
        assert_eq!(err, TournamentError::MatchNotFound(missing));

        let a = h
            .manager
            .create_tournament(
                h.organizer,
                TournamentConfig::swiss("First".to_string(), GameFormat::Standard, 8),
            )
            .await
            .unwrap();
        let b = h
            .manager
            .create_tournament(
                h.organizer,
                TournamentConfig::swiss("Second".to_string(), GameFormat::Standard, 8),
            )
            .await
            .unwrap();
        h.manager
            .open_registration(b.id, h.organizer)
            .await
            .unwrap();

        let all = h.manager.list_tournaments(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let open = h
            .manager
            .list_tournaments(Some(TournamentStatus::RegistrationOpen))
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, b.id);

        let scheduled = h
            .manager
            .list_tournaments(Some(TournamentStatus::Scheduled))
            .await
            .unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, a.id);
    }

    // Helper functions

    struct Harness {
        manager: TournamentManager,
        roster: Arc<InMemoryRoster>,
        ledger: Arc<InMemoryLedger>,
        organizer: PlayerId,
    }

    fn harness() -> Harness {
        harness_with_oracle(None)
    }

    fn harness_with_oracle(oracle: Option<Arc<dyn RatingOracle>>) -> Harness {
        let roster = Arc::new(InMemoryRoster::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let manager = TournamentManager::new(
            Arc::new(InMemoryStore::new()),
            roster.clone(),
            ledger.clone(),
            oracle,
            EngineConfig::default(),
        );
        Harness {
            manager,
            roster,
            ledger,
            organizer: Uuid::new_v4(),
        }
    }

    async fn roster_players(harness: &Harness, count: usize) -> Vec<PlayerId> {
        let mut players = Vec::with_capacity(count);
        for _ in 0..count {
            let id = Uuid::new_v4();
            harness.roster.add_player(id).await;
            players.push(id);
        }
        players
    }

    /// Create a tournament, register everyone and close registration
    async fn ready_tournament(
        harness: &Harness,
        config: TournamentConfig,
        players: &[PlayerId],
    ) -> Tournament {
        let t = harness
            .manager
            .create_tournament(harness.organizer, config)
            .await
            .unwrap();
        harness
            .manager
            .open_registration(t.id, harness.organizer)
            .await
            .unwrap();
        for &p in players {
            harness
                .manager
                .register_player(t.id, p, None)
                .await
                .unwrap();
        }
        harness
            .manager
            .close_registration(t.id, harness.organizer)
            .await
            .unwrap()
    }

    /// Submit a result on behalf of the first player
    async fn submit_result(
        manager: &TournamentManager,
        m: &Match,
        score: (u32, u32, u32),
    ) -> Match {
        manager
            .submit_match_result(
                m.id,
                MatchResultSubmission {
                    player1_wins: score.0,
                    player2_wins: score.1,
                    draws: score.2,
                    notes: None,
                },
                m.player1_id,
            )
            .await
            .unwrap()
    }

    fn standing_for(standings: &[Standing], player_id: PlayerId) -> Standing {
        standings
            .iter()
            .find(|s| s.player_id == player_id)
            .cloned()
            .unwrap()
    }

    fn quality(score: f64) -> MatchQuality {
        MatchQuality {
            score,
            win_probabilities: [0.5, 0.5],
            skill_difference: 0.0,
            uncertainty_factor: 0.2,
            balance_category: BalanceCategory::from_score(score),
        }
    }

    #[derive(Debug, Clone)]
    struct RecordedUpdate {
        format_key: String,
        outcomes: Vec<RankedOutcome>,
        tournament_id: TournamentId,
        match_id: MatchId,
    }

    /// Oracle with canned responses for driving the manager end to end
    struct ScriptedOracle {
        suggestions: Vec<PairingSuggestion>,
        ratings: HashMap<PlayerId, f64>,
        fail: bool,
        updates: Mutex<Vec<RecordedUpdate>>,
    }

    impl ScriptedOracle {
        fn new() -> Self {
            Self {
                suggestions: Vec::new(),
                ratings: HashMap::new(),
                fail: false,
                updates: Mutex::new(Vec::new()),
            }
        }

        fn with_suggestions(mut self, suggestions: Vec<PairingSuggestion>) -> Self {
            self.suggestions = suggestions;
            self
        }

        fn with_rating(mut self, player_id: PlayerId, rating: f64) -> Self {
            self.ratings.insert(player_id, rating);
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn recorded_updates(&self) -> Vec<RecordedUpdate> {
            self.updates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RatingOracle for ScriptedOracle {
        async fn generate_pairings(
            &self,
            _players: &[PlayerId],
            _format_key: &str,
            _previous_pairs: &[(PlayerId, PlayerId)],
        ) -> OracleResult<Vec<PairingSuggestion>> {
            if self.fail {
                return Err(OracleError::Unavailable("scripted outage".to_string()));
            }
            Ok(self.suggestions.clone())
        }

        async fn get_player_rating(
            &self,
            player_id: PlayerId,
            _format_key: &str,
        ) -> OracleResult<PlayerRating> {
            if self.fail {
                return Err(OracleError::Unavailable("scripted outage".to_string()));
            }
            Ok(PlayerRating {
                conservative_rating: self.ratings.get(&player_id).copied().unwrap_or(0.0),
            })
        }

        async fn update_ratings(
            &self,
            format_key: &str,
            outcomes: &[RankedOutcome],
            tournament_id: TournamentId,
            match_id: MatchId,
        ) -> OracleResult<()> {
            if self.fail {
                return Err(OracleError::Unavailable("scripted outage".to_string()));
            }
            self.updates.lock().unwrap().push(RecordedUpdate {
                format_key: format_key.to_string(),
                outcomes: outcomes.to_vec(),
                tournament_id,
                match_id,
            });
            Ok(())
        }
    }
}
