//! Core game state types: positions, pawns, seats, and the game record.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::board::{SAFETY_LEN, TRACK_LEN};
use crate::domain::cards::Card;
use crate::errors::GameError;

pub const MAX_SEATS: u8 = 4;
pub const MIN_SEATS: u8 = 2;
pub const PAWNS_PER_SEAT: usize = 4;

/// Where a pawn currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Position {
    /// Off-board holding area; every pawn begins here.
    Start,
    /// Shared 60-space loop.
    Track { index: u8 },
    /// The owning seat's 5-space inward lane.
    Safety { index: u8 },
    /// Terminal space; requires exact count to enter.
    Home,
}

impl Position {
    pub const fn kind(&self) -> PositionKind {
        match self {
            Position::Start => PositionKind::Start,
            Position::Track { .. } => PositionKind::Track,
            Position::Safety { .. } => PositionKind::Safety,
            Position::Home => PositionKind::Home,
        }
    }

    pub const fn index(&self) -> Option<u8> {
        match self {
            Position::Track { index } | Position::Safety { index } => Some(*index),
            _ => None,
        }
    }

    pub const fn is_movable(&self) -> bool {
        matches!(self, Position::Track { .. } | Position::Safety { .. })
    }
}

/// Position discriminant, used in move descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    Start,
    Track,
    Safety,
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pawn {
    pub pawn_id: String,
    pub seat_index: u8,
    pub position: Position,
}

/// Fixed seat color by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatColor {
    Red,
    Blue,
    Yellow,
    Green,
}

impl SeatColor {
    pub const fn for_seat(index: u8) -> Self {
        match index % MAX_SEATS {
            0 => SeatColor::Red,
            1 => SeatColor::Blue,
            2 => SeatColor::Yellow,
            _ => SeatColor::Green,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Open,
    Joined,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub index: u8,
    pub color: SeatColor,
    pub is_bot: bool,
    pub player_id: Option<String>,
    pub display_name: Option<String>,
    pub status: SeatStatus,
    /// Last human occupant, recorded when the seat was converted to a bot on
    /// a voluntary leave. Enables rejoin rebinding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_player_id: Option<String>,
}

impl Seat {
    pub fn open(index: u8) -> Self {
        Self {
            index,
            color: SeatColor::for_seat(index),
            is_bot: false,
            player_id: None,
            display_name: None,
            status: SeatStatus::Open,
            last_player_id: None,
        }
    }

    pub fn human(index: u8, player_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            index,
            color: SeatColor::for_seat(index),
            is_bot: false,
            player_id: Some(player_id.into()),
            display_name: Some(display_name.into()),
            status: SeatStatus::Joined,
            last_player_id: None,
        }
    }

    /// A seat takes turns when a human holds it or a bot fills it.
    pub fn is_occupied(&self) -> bool {
        self.is_bot || self.player_id.is_some()
    }

    pub fn is_open_human(&self) -> bool {
        !self.is_bot && self.status == SeatStatus::Open && self.player_id.is_none()
    }

    /// Convert to a bot seat, optionally remembering the departing human.
    pub fn convert_to_bot(&mut self, remember_player: bool) {
        self.last_player_id = if remember_player {
            self.player_id.take()
        } else {
            self.player_id = None;
            None
        };
        self.display_name = None;
        self.is_bot = true;
        self.status = SeatStatus::Bot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub max_seats: u8,
    pub deck_seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Lobby,
    Active,
    Finished,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Active,
    Win,
    Aborted,
}

/// Mutable board state, present only once a game has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub turn_number: u32,
    pub current_seat_index: u8,
    pub deck: Vec<Card>,
    pub discard_pile: Vec<Card>,
    pub pawns: Vec<Pawn>,
    pub winner_seat_index: Option<u8>,
    pub result: GameResult,
    /// Number of deck rebuilds so far; feeds rebuild seed derivation.
    #[serde(default)]
    pub deck_epoch: u32,
}

impl GameState {
    pub fn pawns_for_seat(&self, seat_index: u8) -> impl Iterator<Item = &Pawn> {
        self.pawns.iter().filter(move |p| p.seat_index == seat_index)
    }

    pub fn pawn(&self, pawn_id: &str) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.pawn_id == pawn_id)
    }

    pub fn pawn_mut(&mut self, pawn_id: &str) -> Option<&mut Pawn> {
        self.pawns.iter_mut().find(|p| p.pawn_id == pawn_id)
    }

    pub fn pawn_on_track(&self, index: u8) -> Option<&Pawn> {
        debug_assert!(index < TRACK_LEN);
        self.pawns
            .iter()
            .find(|p| p.position == Position::Track { index })
    }

    pub fn pawn_in_safety(&self, seat_index: u8, index: u8) -> Option<&Pawn> {
        debug_assert!(index < SAFETY_LEN);
        self.pawns
            .iter()
            .find(|p| p.seat_index == seat_index && p.position == Position::Safety { index })
    }

    /// Whether every pawn of `seat_index` has reached Home.
    pub fn seat_has_won(&self, seat_index: u8) -> bool {
        let mut count = 0;
        for pawn in self.pawns_for_seat(seat_index) {
            if pawn.position != Position::Home {
                return false;
            }
            count += 1;
        }
        count == PAWNS_PER_SEAT
    }

    /// Advance `current_seat_index` to the next occupied seat and bump the
    /// turn counter. Open seats never take turns.
    pub fn advance_turn(&mut self, seats: &[Seat]) {
        let n = seats.len() as u8;
        let mut idx = self.current_seat_index;
        for _ in 0..n {
            idx = (idx + 1) % n;
            if seats[idx as usize].is_occupied() {
                self.current_seat_index = idx;
                self.turn_number += 1;
                return;
            }
        }
    }
}

/// Identifier for a pawn, stable for the lifetime of the game.
pub fn pawn_id(game_id: &str, seat_index: u8, slot: usize) -> String {
    format!("{game_id}_s{seat_index}_p{slot}")
}

/// Build the initial 4-per-seat pawn roster, everything in Start.
pub fn initial_pawns(game_id: &str, seats: &[Seat]) -> Vec<Pawn> {
    let mut pawns = Vec::with_capacity(seats.len() * PAWNS_PER_SEAT);
    for seat in seats {
        for slot in 0..PAWNS_PER_SEAT {
            pawns.push(Pawn {
                pawn_id: pawn_id(game_id, seat.index, slot),
                seat_index: seat.index,
                position: Position::Start,
            });
        }
    }
    pawns
}

/// One persisted game document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub game_id: String,
    pub host_id: String,
    pub host_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub phase: GamePhase,
    pub settings: GameSettings,
    pub seats: Vec<Seat>,
    pub state: Option<GameState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted_reason: Option<String>,
    /// Optimistic concurrency token maintained by the store.
    #[serde(default)]
    pub lock_version: i32,
}

impl Game {
    pub fn seat_of(&self, user_id: &str) -> Option<&Seat> {
        self.seats
            .iter()
            .find(|s| s.player_id.as_deref() == Some(user_id))
    }

    pub fn seat_of_mut(&mut self, user_id: &str) -> Option<&mut Seat> {
        self.seats
            .iter_mut()
            .find(|s| s.player_id.as_deref() == Some(user_id))
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_id == user_id
    }

    pub fn require_state(&self) -> Result<&GameState, GameError> {
        match self.phase {
            GamePhase::Lobby => Err(GameError::GameNotStarted),
            _ => self
                .state
                .as_ref()
                .ok_or_else(|| GameError::invalid_state("missing state for started game")),
        }
    }

    pub fn require_state_mut(&mut self) -> Result<&mut GameState, GameError> {
        match self.phase {
            GamePhase::Lobby => Err(GameError::GameNotStarted),
            _ => self
                .state
                .as_mut()
                .ok_or_else(|| GameError::invalid_state("missing state for started game")),
        }
    }

    pub fn occupied_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn human_seats(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| !s.is_bot && s.player_id.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_wire_shape_is_tagged() {
        let track = serde_json::to_value(Position::Track { index: 12 }).unwrap();
        assert_eq!(track, serde_json::json!({"type": "track", "index": 12}));
        let start = serde_json::to_value(Position::Start).unwrap();
        assert_eq!(start, serde_json::json!({"type": "start"}));
    }

    #[test]
    fn seat_colors_follow_index_order() {
        assert_eq!(SeatColor::for_seat(0), SeatColor::Red);
        assert_eq!(SeatColor::for_seat(1), SeatColor::Blue);
        assert_eq!(SeatColor::for_seat(2), SeatColor::Yellow);
        assert_eq!(SeatColor::for_seat(3), SeatColor::Green);
    }

    #[test]
    fn convert_to_bot_remembers_player_on_request() {
        let mut seat = Seat::human(1, "u1", "Alice");
        seat.convert_to_bot(true);
        assert!(seat.is_bot);
        assert_eq!(seat.status, SeatStatus::Bot);
        assert_eq!(seat.last_player_id.as_deref(), Some("u1"));
        assert!(seat.player_id.is_none());

        let mut seat = Seat::human(2, "u2", "Bob");
        seat.convert_to_bot(false);
        assert!(seat.last_player_id.is_none());
    }

    #[test]
    fn advance_turn_skips_open_seats() {
        let seats = vec![
            Seat::human(0, "host", "Host"),
            Seat::open(1),
            {
                let mut s = Seat::open(2);
                s.convert_to_bot(false);
                s
            },
            Seat::open(3),
        ];
        let mut state = GameState {
            turn_number: 0,
            current_seat_index: 0,
            deck: Vec::new(),
            discard_pile: Vec::new(),
            pawns: Vec::new(),
            winner_seat_index: None,
            result: GameResult::Active,
            deck_epoch: 0,
        };
        state.advance_turn(&seats);
        assert_eq!(state.current_seat_index, 2);
        assert_eq!(state.turn_number, 1);
        state.advance_turn(&seats);
        assert_eq!(state.current_seat_index, 0);
        assert_eq!(state.turn_number, 2);
    }

    #[test]
    fn initial_pawns_are_four_per_seat_in_start() {
        let seats = vec![Seat::human(0, "u", "U"), Seat::open(1)];
        let pawns = initial_pawns("g1", &seats);
        assert_eq!(pawns.len(), 8);
        assert!(pawns.iter().all(|p| p.position == Position::Start));
        assert_eq!(pawns[0].pawn_id, "g1_s0_p0");
        assert_eq!(pawns[7].pawn_id, "g1_s1_p3");
    }
}
