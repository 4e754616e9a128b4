//! Test helpers for building games and states in known configurations.

use time::OffsetDateTime;

use crate::domain::deck::new_deck;
use crate::domain::state::{
    initial_pawns, Game, GamePhase, GameResult, GameSettings, GameState, Position, Seat,
};

/// Two-seat game (seat 0 human host, seat 1 human) with a seeded deck and
/// all pawns in Start.
pub fn two_player_game(seed: u64) -> Game {
    game_with_seats(
        vec![Seat::human(0, "p0", "p0"), Seat::human(1, "p1", "p1")],
        seed,
    )
}

pub fn game_with_seats(seats: Vec<Seat>, seed: u64) -> Game {
    let now = OffsetDateTime::UNIX_EPOCH;
    let pawns = initial_pawns("g1", &seats);
    Game {
        game_id: "g1".to_string(),
        host_id: "p0".to_string(),
        host_name: "p0".to_string(),
        created_at: now,
        updated_at: now,
        ended_at: None,
        phase: GamePhase::Active,
        settings: GameSettings {
            max_seats: seats.len() as u8,
            deck_seed: Some(seed),
        },
        seats,
        state: Some(GameState {
            turn_number: 0,
            current_seat_index: 0,
            deck: new_deck(seed),
            discard_pile: Vec::new(),
            pawns,
            winner_seat_index: None,
            result: GameResult::Active,
            deck_epoch: 0,
        }),
        aborted_reason: None,
        lock_version: 0,
    }
}

/// Shorthand for the mutable state of a fixture game.
pub fn state_of(game: &mut Game) -> &mut GameState {
    game.state.as_mut().expect("fixture game has state")
}

/// Place the pawn with the given id, panicking if it does not exist.
pub fn place_pawn(state: &mut GameState, pawn_id: &str, position: Position) {
    state
        .pawn_mut(pawn_id)
        .unwrap_or_else(|| panic!("no pawn {pawn_id}"))
        .position = position;
}

/// Pawn id helper matching the fixture game id.
pub fn pid(seat: u8, slot: usize) -> String {
    format!("g1_s{seat}_p{slot}")
}
