//! In-memory game store.
//!
//! Backs the same contract a replicated document store would satisfy:
//! updates run as compare-and-set loops on `lock_version`, so coordinator
//! code exercises the identical conflict/retry surface in tests and in
//! single-node deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::debug;

use crate::domain::state::{Game, GamePhase};
use crate::errors::GameError;
use crate::store::{GameStore, MoveRecord};

const UPDATE_RETRIES: usize = 3;

#[derive(Default)]
pub struct MemoryGameStore {
    games: DashMap<String, Game>,
    moves: DashMap<String, Vec<MoveRecord>>,
    active_games: DashMap<String, String>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn create_game(&self, mut game: Game) -> Result<Game, GameError> {
        game.lock_version = 0;
        let game_id = game.game_id.clone();
        if self.games.contains_key(&game_id) {
            return Err(GameError::Conflict);
        }
        self.games.insert(game_id.clone(), game.clone());
        debug!(%game_id, "game created");
        Ok(game)
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameError> {
        Ok(self.games.get(game_id).map(|g| g.value().clone()))
    }

    async fn update_game(
        &self,
        game_id: &str,
        mutate: &mut (dyn for<'a> FnMut(&'a mut Game) -> Result<(), GameError> + Send),
    ) -> Result<Game, GameError> {
        for _ in 0..UPDATE_RETRIES {
            let mut working = self
                .games
                .get(game_id)
                .map(|g| g.value().clone())
                .ok_or(GameError::NotFound)?;
            let expected_version = working.lock_version;

            mutate(&mut working)?;
            working.lock_version = expected_version + 1;
            working.updated_at = OffsetDateTime::now_utc();

            // Compare-and-set on the version read above; a concurrent commit
            // in between sends us around for another attempt.
            let mut entry = self.games.get_mut(game_id).ok_or(GameError::NotFound)?;
            if entry.lock_version == expected_version {
                *entry = working.clone();
                return Ok(working);
            }
            drop(entry);
            debug!(game_id, expected_version, "optimistic lock miss, retrying");
        }
        Err(GameError::Conflict)
    }

    async fn delete_game(&self, game_id: &str) -> Result<(), GameError> {
        self.games.remove(game_id);
        self.moves.remove(game_id);
        Ok(())
    }

    async fn list_lobby_games(&self) -> Result<Vec<Game>, GameError> {
        let mut games: Vec<Game> = self
            .games
            .iter()
            .filter(|entry| entry.value().phase == GamePhase::Lobby)
            .map(|entry| entry.value().clone())
            .collect();
        games.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(games)
    }

    async fn append_move(&self, game_id: &str, mut record: MoveRecord) -> Result<(), GameError> {
        let mut entries = self.moves.entry(game_id.to_string()).or_default();
        record.index = entries.len() as u32;
        entries.push(record);
        Ok(())
    }

    async fn moves_for_game(&self, game_id: &str) -> Result<Vec<MoveRecord>, GameError> {
        Ok(self
            .moves
            .get(game_id)
            .map(|m| m.value().clone())
            .unwrap_or_default())
    }

    async fn set_active_game(
        &self,
        user_id: &str,
        game_id: Option<&str>,
    ) -> Result<(), GameError> {
        match game_id {
            Some(game_id) => {
                self.active_games
                    .insert(user_id.to_string(), game_id.to_string());
            }
            None => {
                self.active_games.remove(user_id);
            }
        }
        Ok(())
    }

    async fn get_active_game(&self, user_id: &str) -> Result<Option<String>, GameError> {
        Ok(self.active_games.get(user_id).map(|g| g.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::domain::state::{GameSettings, Seat};

    fn lobby_game(game_id: &str) -> Game {
        let now = OffsetDateTime::now_utc();
        Game {
            game_id: game_id.to_string(),
            host_id: "host".to_string(),
            host_name: "host".to_string(),
            created_at: now,
            updated_at: now,
            ended_at: None,
            phase: GamePhase::Lobby,
            settings: GameSettings {
                max_seats: 2,
                deck_seed: None,
            },
            seats: vec![Seat::human(0, "host", "host"), Seat::open(1)],
            state: None,
            aborted_reason: None,
            lock_version: 0,
        }
    }

    #[tokio::test]
    async fn update_commits_and_bumps_the_version() {
        let store = MemoryGameStore::new();
        store.create_game(lobby_game("g1")).await.unwrap();

        let updated = store
            .update_game("g1", &mut |game| {
                game.host_name = "renamed".to_string();
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(updated.host_name, "renamed");
        assert_eq!(updated.lock_version, 1);

        let stored = store.get_game("g1").await.unwrap().unwrap();
        assert_eq!(stored.host_name, "renamed");
    }

    #[tokio::test]
    async fn failed_mutation_leaves_the_record_untouched() {
        let store = MemoryGameStore::new();
        store.create_game(lobby_game("g1")).await.unwrap();

        let err = store
            .update_game("g1", &mut |game| {
                game.host_name = "mutated".to_string();
                Err(GameError::NotHost)
            })
            .await
            .unwrap_err();
        assert_eq!(err, GameError::NotHost);

        let stored = store.get_game("g1").await.unwrap().unwrap();
        assert_eq!(stored.host_name, "host");
        assert_eq!(stored.lock_version, 0);
    }

    #[tokio::test]
    async fn update_of_missing_game_is_not_found() {
        let store = MemoryGameStore::new();
        let err = store
            .update_game("nope", &mut |_game| Ok(()))
            .await
            .unwrap_err();
        assert_eq!(err, GameError::NotFound);
    }

    #[tokio::test]
    async fn append_move_assigns_monotonic_indices() {
        let store = MemoryGameStore::new();
        let record = MoveRecord {
            index: 99,
            seat_index: 0,
            player_id: Some("host".to_string()),
            card: crate::domain::cards::Card::One,
            moved_pawns: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        store.append_move("g1", record.clone()).await.unwrap();
        store.append_move("g1", record).await.unwrap();

        let moves = store.moves_for_game("g1").await.unwrap();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].index, 0);
        assert_eq!(moves[1].index, 1);
    }

    #[tokio::test]
    async fn active_game_mapping_round_trips() {
        let store = MemoryGameStore::new();
        assert_eq!(store.get_active_game("u1").await.unwrap(), None);
        store.set_active_game("u1", Some("g1")).await.unwrap();
        assert_eq!(
            store.get_active_game("u1").await.unwrap(),
            Some("g1".to_string())
        );
        store.set_active_game("u1", None).await.unwrap();
        assert_eq!(store.get_active_game("u1").await.unwrap(), None);
    }
}
