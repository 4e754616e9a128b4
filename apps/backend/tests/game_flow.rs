//! End-to-end session and turn flows over the in-memory store.

mod support;

use losiento_backend::domain::selector::ClientMovePayload;
use losiento_backend::domain::state::{GamePhase, GameResult, SeatStatus};
use losiento_backend::errors::GameError;
use support::{build_state, first_move_payload, seeded_solo_game};

#[tokio::test]
async fn host_join_start_happy_path() {
    let state = build_state();

    let game = state.sessions.host("alice", Some("Alice"), 3, None).await.unwrap();
    assert_eq!(game.phase, GamePhase::Lobby);
    assert_eq!(game.seats.len(), 3);
    assert_eq!(game.seats[0].player_id.as_deref(), Some("alice"));
    assert!(game.seats[1].is_open_human());

    let joinable = state.sessions.list_joinable().await.unwrap();
    assert_eq!(joinable.len(), 1);

    let game = state
        .sessions
        .join("bob", &game.game_id, Some("Bob"))
        .await
        .unwrap();
    assert_eq!(game.seats[1].player_id.as_deref(), Some("bob"));
    assert_eq!(game.seats[1].status, SeatStatus::Joined);

    let game = state.sessions.start("alice", &game.game_id).await.unwrap();
    assert_eq!(game.phase, GamePhase::Active);
    let gs = game.state.as_ref().expect("state initialized");
    assert_eq!(gs.pawns.len(), 12, "4 pawns for each of the 3 seats");
    assert_eq!(gs.deck.len(), 45);
    assert_eq!(gs.current_seat_index, 0);
    assert_eq!(gs.turn_number, 0);
    assert!(game.settings.deck_seed.is_some(), "start fixes a seed");
}

#[tokio::test]
async fn users_are_limited_to_one_active_game() {
    let state = build_state();

    let game = state.sessions.host("alice", None, 2, None).await.unwrap();
    let err = state.sessions.host("alice", None, 2, None).await.unwrap_err();
    assert_eq!(err, GameError::AlreadyInGame);

    state.sessions.join("bob", &game.game_id, None).await.unwrap();
    let other = state.sessions.host("carol", None, 2, None).await.unwrap();
    let err = state
        .sessions
        .join("bob", &other.game_id, None)
        .await
        .unwrap_err();
    assert_eq!(err, GameError::AlreadyInGame);

    // Re-joining the same game is idempotent.
    let rejoined = state.sessions.join("bob", &game.game_id, None).await.unwrap();
    assert_eq!(rejoined.game_id, game.game_id);
}

#[tokio::test]
async fn start_requires_two_seats_and_a_host() {
    let state = build_state();

    let game = state.sessions.host("alice", None, 2, None).await.unwrap();
    let err = state.sessions.start("alice", &game.game_id).await.unwrap_err();
    assert_eq!(err, GameError::InsufficientPlayers);

    state.sessions.join("bob", &game.game_id, None).await.unwrap();
    let err = state.sessions.start("bob", &game.game_id).await.unwrap_err();
    assert_eq!(err, GameError::NotHost);

    let game = state.sessions.start("alice", &game.game_id).await.unwrap();
    assert_eq!(game.phase, GamePhase::Active);

    let err = state.sessions.start("alice", &game.game_id).await.unwrap_err();
    assert_eq!(err, GameError::LobbyOnly);
}

#[tokio::test]
async fn configure_seat_preconditions() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 3, None).await.unwrap();

    let err = state
        .sessions
        .configure_seat("bob", &game.game_id, 1, true)
        .await
        .unwrap_err();
    assert_eq!(err, GameError::NotHost);

    let err = state
        .sessions
        .configure_seat("alice", &game.game_id, 0, true)
        .await
        .unwrap_err();
    assert_eq!(err, GameError::CannotToggleHostSeat);

    let err = state
        .sessions
        .configure_seat("alice", &game.game_id, 7, true)
        .await
        .unwrap_err();
    assert_eq!(err, GameError::InvalidSeat);

    let game = state
        .sessions
        .configure_seat("alice", &game.game_id, 1, true)
        .await
        .unwrap();
    assert!(game.seats[1].is_bot);
    assert_eq!(game.seats[1].status, SeatStatus::Bot);

    let game = state
        .sessions
        .configure_seat("alice", &game.game_id, 1, false)
        .await
        .unwrap();
    assert!(game.seats[1].is_open_human());
}

#[tokio::test]
async fn converting_a_joined_seat_to_bot_frees_the_user() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 2, None).await.unwrap();
    state.sessions.join("bob", &game.game_id, None).await.unwrap();

    state
        .sessions
        .configure_seat("alice", &game.game_id, 1, true)
        .await
        .unwrap();

    // Bob's mapping is gone, so he can host his own game.
    assert!(state
        .sessions
        .active_game_for_user("bob")
        .await
        .unwrap()
        .is_none());
    state.sessions.host("bob", None, 2, None).await.unwrap();
}

#[tokio::test]
async fn kick_fills_the_seat_with_a_bot_and_frees_the_user() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 2, None).await.unwrap();
    state.sessions.join("bob", &game.game_id, None).await.unwrap();
    state.sessions.start("alice", &game.game_id).await.unwrap();

    let game = state.sessions.kick("alice", &game.game_id, 1).await.unwrap();
    assert!(game.seats[1].is_bot);
    assert!(
        game.seats[1].last_player_id.is_none(),
        "a kicked user keeps no rejoin claim"
    );
    assert!(state
        .sessions
        .active_game_for_user("bob")
        .await
        .unwrap()
        .is_none());

    let err = state.sessions.kick("alice", &game.game_id, 0).await.unwrap_err();
    assert_eq!(err, GameError::CannotToggleHostSeat);
}

#[tokio::test]
async fn nonhost_leave_converts_the_seat_and_rejoin_rebinds_it() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 2, None).await.unwrap();
    state.sessions.join("bob", &game.game_id, None).await.unwrap();
    state.sessions.start("alice", &game.game_id).await.unwrap();

    let left = state
        .sessions
        .leave("bob", &game.game_id)
        .await
        .unwrap()
        .expect("game survives a non-host leave");
    assert!(left.seats[1].is_bot);
    assert_eq!(left.seats[1].last_player_id.as_deref(), Some("bob"));
    assert_eq!(left.phase, GamePhase::Active);

    // Joining the active game again rebinds the vacated seat.
    let rejoined = state
        .sessions
        .join("bob", &game.game_id, Some("Bob"))
        .await
        .unwrap();
    assert!(!rejoined.seats[1].is_bot);
    assert_eq!(rejoined.seats[1].player_id.as_deref(), Some("bob"));
    assert_eq!(rejoined.seats[1].status, SeatStatus::Joined);
}

#[tokio::test]
async fn host_leave_disposes_a_lobby() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 2, None).await.unwrap();
    state.sessions.join("bob", &game.game_id, None).await.unwrap();

    let disposed = state.sessions.leave("alice", &game.game_id).await.unwrap();
    assert!(disposed.is_none());
    assert!(state
        .sessions
        .active_game_for_user("alice")
        .await
        .unwrap()
        .is_none());
    assert!(state
        .sessions
        .active_game_for_user("bob")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn host_leave_aborts_an_active_game() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 2, None).await.unwrap();
    state.sessions.join("bob", &game.game_id, None).await.unwrap();
    state.sessions.start("alice", &game.game_id).await.unwrap();

    let aborted = state
        .sessions
        .leave("alice", &game.game_id)
        .await
        .unwrap()
        .expect("aborted record survives");
    assert_eq!(aborted.phase, GamePhase::Aborted);
    assert_eq!(aborted.aborted_reason.as_deref(), Some("host_left"));
    assert!(aborted.ended_at.is_some());
    assert_eq!(
        aborted.state.as_ref().unwrap().result,
        GameResult::Aborted
    );
    assert!(state
        .sessions
        .active_game_for_user("bob")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn play_validates_the_caller_and_phase() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 2, None).await.unwrap();

    let err = state
        .turns
        .play_human("alice", &game.game_id, &ClientMovePayload::default())
        .await
        .unwrap_err();
    assert_eq!(err, GameError::GameNotStarted);

    state.sessions.join("bob", &game.game_id, None).await.unwrap();
    state.sessions.start("alice", &game.game_id).await.unwrap();

    let err = state
        .turns
        .play_human("carol", &game.game_id, &ClientMovePayload::default())
        .await
        .unwrap_err();
    assert_eq!(err, GameError::NotInGame);

    let err = state
        .turns
        .play_human("bob", &game.game_id, &ClientMovePayload::default())
        .await
        .unwrap_err();
    assert_eq!(err, GameError::NotYourTurn);
}

#[tokio::test]
async fn preview_matches_the_card_actually_drawn() {
    let state = build_state();
    let game = seeded_solo_game(&state, "alice", 123).await;

    let preview = state.turns.preview("alice", &game.game_id).await.unwrap();
    let again = state.turns.preview("alice", &game.game_id).await.unwrap();
    assert_eq!(preview, again, "preview is stable until the game advances");

    let played = state
        .turns
        .play_human("alice", &game.game_id, &first_move_payload())
        .await
        .unwrap();
    let history = state.turns.move_history(&game.game_id).await.unwrap();
    assert_eq!(history[0].card, preview.card);
    assert_eq!(history[0].seat_index, 0);
    assert_eq!(history[0].player_id.as_deref(), Some("alice"));

    let gs = played.state.as_ref().unwrap();
    assert_eq!(gs.deck.len() + gs.discard_pile.len(), 45);
}

#[tokio::test]
async fn selection_failure_rolls_the_whole_turn_back() {
    let state = build_state();
    let game = seeded_solo_game(&state, "alice", 123).await;

    let preview = state.turns.preview("alice", &game.game_id).await.unwrap();
    if preview.moves.len() > 1 {
        // No selection provided: the draw must not commit.
        let err = state
            .turns
            .play_human("alice", &game.game_id, &ClientMovePayload::default())
            .await
            .unwrap_err();
        assert_eq!(err, GameError::MoveSelectionRequired);

        let unchanged = state
            .sessions
            .active_game_for_user("alice")
            .await
            .unwrap()
            .unwrap();
        let gs = unchanged.state.as_ref().unwrap();
        assert_eq!(gs.deck.len(), 45, "the draw was rolled back");
        assert_eq!(gs.turn_number, 0);
        assert!(state
            .turns
            .move_history(&game.game_id)
            .await
            .unwrap()
            .is_empty());
    }
}

#[tokio::test]
async fn bot_step_is_gated_then_advances_the_bot_seat() {
    let state = build_state();
    let game = seeded_solo_game(&state, "alice", 99).await;

    state
        .turns
        .play_human("alice", &game.game_id, &first_move_payload())
        .await
        .unwrap();

    let current = state
        .sessions
        .active_game_for_user("alice")
        .await
        .unwrap()
        .unwrap();
    let turn_before = current.state.as_ref().unwrap().turn_number;
    assert_eq!(current.state.as_ref().unwrap().current_seat_index, 1);

    // Immediately after the human commit the visibility gate holds the bot.
    let gated = state.turns.bot_step(&game.game_id).await.unwrap();
    assert_eq!(gated.state.as_ref().unwrap().turn_number, turn_before);

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let stepped = state.turns.bot_step(&game.game_id).await.unwrap();
    let gs = stepped.state.as_ref().unwrap();
    assert!(gs.turn_number > turn_before);
    assert_eq!(gs.deck.len() + gs.discard_pile.len(), 45);

    // With the human to act again, the bot cannot step.
    if gs.result == GameResult::Active {
        assert_eq!(gs.current_seat_index, 0);
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let err = state.turns.bot_step(&game.game_id).await.unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
    }
}

#[tokio::test]
async fn two_humans_can_play_many_turns_without_breaking_invariants() {
    let state = build_state();
    let game = state.sessions.host("alice", None, 2, Some(7)).await.unwrap();
    state.sessions.join("bob", &game.game_id, None).await.unwrap();
    state.sessions.start("alice", &game.game_id).await.unwrap();

    let mut finished = false;
    for _ in 0..300 {
        let current = state
            .sessions
            .active_game_for_user("alice")
            .await
            .unwrap()
            .unwrap();
        let gs = current.state.as_ref().unwrap();
        if gs.result != GameResult::Active {
            finished = true;
            assert_eq!(current.phase, GamePhase::Finished);
            assert!(gs.winner_seat_index.is_some());
            break;
        }
        let user = if gs.current_seat_index == 0 { "alice" } else { "bob" };
        state
            .turns
            .play_human(user, &current.game_id, &first_move_payload())
            .await
            .unwrap();

        let after = state
            .sessions
            .active_game_for_user("alice")
            .await
            .unwrap()
            .unwrap();
        let gs = after.state.as_ref().unwrap();
        assert_eq!(gs.deck.len() + gs.discard_pile.len(), 45);
        assert_eq!(gs.pawns.len(), 8);
    }

    // Whether or not anyone won inside the cap, the record must still be
    // structurally sound.
    let final_game = state
        .sessions
        .active_game_for_user("alice")
        .await
        .unwrap();
    if !finished {
        assert!(final_game.is_some());
    }
}
