//! Shared helpers for integration suites.
#![allow(dead_code)]

use std::sync::Arc;

use losiento_backend::config::AppConfig;
use losiento_backend::domain::selector::ClientMovePayload;
use losiento_backend::domain::state::Game;
use losiento_backend::state::AppState;
use losiento_backend::store::MemoryGameStore;

pub fn build_state() -> AppState {
    AppState::new(Arc::new(MemoryGameStore::new()), AppConfig::default())
}

/// Host a seeded two-seat game for `host`, fill seat 1 with a bot, and
/// start it.
pub async fn seeded_solo_game(state: &AppState, host: &str, seed: u64) -> Game {
    let game = state
        .sessions
        .host(host, Some(host), 2, Some(seed))
        .await
        .expect("host");
    state
        .sessions
        .configure_seat(host, &game.game_id, 1, true)
        .await
        .expect("configure bot");
    state
        .sessions
        .start(host, &game.game_id)
        .await
        .expect("start")
}

/// Payload that resolves any selection ambiguity by taking the first move,
/// for the primary card and a possible card-2 follow-up alike.
pub fn first_move_payload() -> ClientMovePayload {
    ClientMovePayload {
        move_index: Some(0),
        descriptor: None,
        secondary: Some(Box::new(ClientMovePayload {
            move_index: Some(0),
            descriptor: None,
            secondary: None,
        })),
    }
}
