use crate::domain::fixtures::{pid, place_pawn, state_of, two_player_game};
use crate::domain::snapshot::{joinable_entry, legal_movers_preview, to_client};
use crate::domain::state::{GamePhase, Position};
use crate::errors::GameError;

#[test]
fn to_client_hides_deck_contents() {
    let game = two_player_game(7);
    let view = to_client(&game, "p0");
    let state = view.state.expect("active game projects state");
    assert_eq!(state.deck_size, 45);

    let json = serde_json::to_value(&state).unwrap();
    assert!(json.get("deck").is_none(), "deck order must not leak");
    assert!(json.get("deckSize").is_some());
}

#[test]
fn to_client_hides_the_deck_seed() {
    let game = two_player_game(7);
    let json = serde_json::to_value(to_client(&game, "p0")).unwrap();
    assert!(json["settings"].get("deckSeed").is_none());
    assert_eq!(json["settings"]["maxSeats"], 2);
}

#[test]
fn viewer_seat_index_matches_the_caller() {
    let game = two_player_game(7);
    assert_eq!(to_client(&game, "p0").viewer_seat_index, Some(0));
    assert_eq!(to_client(&game, "p1").viewer_seat_index, Some(1));
    assert_eq!(to_client(&game, "stranger").viewer_seat_index, None);
}

#[test]
fn to_client_is_deterministic() {
    let game = two_player_game(7);
    let a = serde_json::to_string(&to_client(&game, "p0")).unwrap();
    let b = serde_json::to_string(&to_client(&game, "p0")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn preview_simulates_the_next_draw_without_mutating() {
    let mut game = two_player_game(7);
    place_pawn(state_of(&mut game), &pid(0, 0), Position::Track { index: 30 });
    let before = game.clone();

    let preview = legal_movers_preview(&game, "p0").unwrap();
    assert_eq!(game, before, "preview must not mutate the record");
    assert_eq!(
        preview.card,
        game.state.as_ref().unwrap().deck[0],
        "preview draws the real top card"
    );
    for (i, mv) in preview.moves.iter().enumerate() {
        assert_eq!(mv.index, i);
        assert!(preview.pawn_ids.contains(&mv.descriptor.pawn_id));
    }
}

#[test]
fn preview_is_stable_across_calls() {
    let mut game = two_player_game(7);
    place_pawn(state_of(&mut game), &pid(0, 0), Position::Track { index: 30 });

    let a = serde_json::to_string(&legal_movers_preview(&game, "p0").unwrap()).unwrap();
    let b = serde_json::to_string(&legal_movers_preview(&game, "p0").unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn preview_rejects_outsiders_and_lobbies() {
    let mut game = two_player_game(7);
    assert_eq!(
        legal_movers_preview(&game, "stranger").unwrap_err(),
        GameError::NotInGame
    );

    game.phase = GamePhase::Lobby;
    game.state = None;
    assert_eq!(
        legal_movers_preview(&game, "p0").unwrap_err(),
        GameError::GameNotStarted
    );
}

#[test]
fn joinable_entry_counts_humans_and_bots() {
    let mut game = two_player_game(7);
    game.seats[1].convert_to_bot(false);
    let entry = joinable_entry(&game);
    assert_eq!(entry.current_players, 2);
    assert_eq!(entry.max_seats, 2);
    assert_eq!(entry.host_name, "p0");
}
