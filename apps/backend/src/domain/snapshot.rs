//! Client-facing projections of game records.
//!
//! Shapes here are bit-stable: the same game record always projects to the
//! same JSON. The deck is exposed only by size; its remaining order (and the
//! seed that produced it) never leaves the server.

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;
use crate::domain::deck;
use crate::domain::moves::{legal_moves, Move};
use crate::domain::state::{
    Game, GamePhase, GameResult, GameSettings, Position, Seat, SeatColor, SeatStatus,
};
use crate::errors::GameError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub game_id: String,
    pub phase: GamePhase,
    pub host_id: String,
    pub host_name: String,
    pub settings: SettingsView,
    pub seats: Vec<SeatView>,
    pub state: Option<StateView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_seat_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub max_seats: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub index: u8,
    pub color: SeatColor,
    pub is_bot: bool,
    pub player_id: Option<String>,
    pub display_name: Option<String>,
    pub status: SeatStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub turn_number: u32,
    pub current_seat_index: u8,
    pub deck_size: usize,
    pub discard_pile: Vec<Card>,
    pub board: BoardView,
    pub winner_seat_index: Option<u8>,
    pub result: GameResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub pawns: Vec<PawnView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PawnView {
    pub pawn_id: String,
    pub seat_index: u8,
    pub position: Position,
}

fn seat_view(seat: &Seat) -> SeatView {
    SeatView {
        index: seat.index,
        color: seat.color,
        is_bot: seat.is_bot,
        player_id: seat.player_id.clone(),
        display_name: seat.display_name.clone(),
        status: seat.status,
    }
}

fn settings_view(settings: &GameSettings) -> SettingsView {
    SettingsView {
        max_seats: settings.max_seats,
    }
}

/// Shape a game record for client consumption.
pub fn to_client(game: &Game, viewer_user_id: &str) -> GameView {
    let state = game.state.as_ref().map(|s| StateView {
        turn_number: s.turn_number,
        current_seat_index: s.current_seat_index,
        deck_size: s.deck.len(),
        discard_pile: s.discard_pile.clone(),
        board: BoardView {
            pawns: s
                .pawns
                .iter()
                .map(|p| PawnView {
                    pawn_id: p.pawn_id.clone(),
                    seat_index: p.seat_index,
                    position: p.position,
                })
                .collect(),
        },
        winner_seat_index: s.winner_seat_index,
        result: s.result,
    });

    GameView {
        game_id: game.game_id.clone(),
        phase: game.phase,
        host_id: game.host_id.clone(),
        host_name: game.host_name.clone(),
        settings: settings_view(&game.settings),
        seats: game.seats.iter().map(seat_view).collect(),
        state,
        viewer_seat_index: game.seat_of(viewer_user_id).map(|s| s.index),
        aborted_reason: game.aborted_reason.clone(),
    }
}

/// One lobby entry in the joinable listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinableGame {
    pub game_id: String,
    pub host_name: String,
    pub current_players: usize,
    pub max_seats: u8,
}

pub fn joinable_entry(game: &Game) -> JoinableGame {
    JoinableGame {
        game_id: game.game_id.clone(),
        host_name: game.host_name.clone(),
        current_players: game
            .seats
            .iter()
            .filter(|s| s.status == SeatStatus::Joined || s.is_bot)
            .count(),
        max_seats: game.settings.max_seats,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMoversView {
    pub game_id: String,
    pub card: Card,
    pub pawn_ids: Vec<String>,
    pub moves: Vec<IndexedMove>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedMove {
    pub index: usize,
    #[serde(flatten)]
    pub descriptor: Move,
}

/// Non-mutating preview of the current seat's next draw and its legal moves.
///
/// Simulates the draw on a cloned state with the same seed continuation a
/// real draw would use, so repeated calls agree until the game advances.
pub fn legal_movers_preview(game: &Game, viewer_user_id: &str) -> Result<LegalMoversView, GameError> {
    if game.seat_of(viewer_user_id).is_none() {
        return Err(GameError::NotInGame);
    }
    match game.phase {
        GamePhase::Lobby => return Err(GameError::GameNotStarted),
        GamePhase::Finished | GamePhase::Aborted => return Err(GameError::GameOver),
        GamePhase::Active => {}
    }
    let state = game.require_state()?;
    if state.result != GameResult::Active {
        return Err(GameError::GameOver);
    }
    let seed = game
        .settings
        .deck_seed
        .ok_or_else(|| GameError::invalid_state("active game has no deck seed"))?;

    let mut simulated = state.clone();
    let card = deck::draw(&mut simulated, seed);
    let moves = legal_moves(&simulated, simulated.current_seat_index, card);

    let mut pawn_ids: Vec<String> = Vec::new();
    for mv in &moves {
        if !pawn_ids.contains(&mv.pawn_id) {
            pawn_ids.push(mv.pawn_id.clone());
        }
    }

    Ok(LegalMoversView {
        game_id: game.game_id.clone(),
        card,
        pawn_ids,
        moves: moves
            .into_iter()
            .enumerate()
            .map(|(index, descriptor)| IndexedMove { index, descriptor })
            .collect(),
    })
}
