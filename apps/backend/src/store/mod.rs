//! Game store contract: persistence for game records, move history, and the
//! per-user active-game mapping.
//!
//! All coordinator mutations go through [`GameStore::update_game`], whose
//! closure executes as an atomic read-modify-write; a closure error leaves
//! the stored record untouched.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::cards::Card;
use crate::domain::state::{Game, GameState, Position};
use crate::errors::GameError;

pub use memory::MemoryGameStore;

/// One appended move-history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// Monotonic per-game index, assigned by the store on append.
    pub index: u32,
    pub seat_index: u8,
    /// None for bot moves.
    pub player_id: Option<String>,
    pub card: Card,
    pub moved_pawns: Vec<MovedPawn>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovedPawn {
    pub pawn_id: String,
    pub from_position: Position,
    pub to_position: Position,
}

/// Positions that changed between two states, for move-history entries.
pub fn diff_pawns(before: &GameState, after: &GameState) -> Vec<MovedPawn> {
    before
        .pawns
        .iter()
        .filter_map(|prev| {
            let next = after.pawn(&prev.pawn_id)?;
            if next.position == prev.position {
                None
            } else {
                Some(MovedPawn {
                    pawn_id: prev.pawn_id.clone(),
                    from_position: prev.position,
                    to_position: next.position,
                })
            }
        })
        .collect()
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn create_game(&self, game: Game) -> Result<Game, GameError>;

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameError>;

    /// Atomic read-modify-write. The closure sees the current record; on
    /// `Ok(())` the mutation commits with a bumped `lock_version` and fresh
    /// `updated_at`, on `Err` nothing is written. Conflicting writers are
    /// retried a bounded number of times before surfacing `conflict`.
    async fn update_game(
        &self,
        game_id: &str,
        mutate: &mut (dyn for<'a> FnMut(&'a mut Game) -> Result<(), GameError> + Send),
    ) -> Result<Game, GameError>;

    async fn delete_game(&self, game_id: &str) -> Result<(), GameError>;

    /// Lobby-phase games, for the joinable listing.
    async fn list_lobby_games(&self) -> Result<Vec<Game>, GameError>;

    /// Append a history entry; the store assigns the monotonic index.
    async fn append_move(&self, game_id: &str, record: MoveRecord) -> Result<(), GameError>;

    async fn moves_for_game(&self, game_id: &str) -> Result<Vec<MoveRecord>, GameError>;

    async fn set_active_game(
        &self,
        user_id: &str,
        game_id: Option<&str>,
    ) -> Result<(), GameError>;

    async fn get_active_game(&self, user_id: &str) -> Result<Option<String>, GameError>;
}

/// `get_game` that converts a missing record into `not_found`.
pub async fn require_game(store: &dyn GameStore, game_id: &str) -> Result<Game, GameError> {
    store.get_game(game_id).await?.ok_or(GameError::NotFound)
}
