//! Session manager: hosting, joining, seat configuration, and lifecycle
//! transitions for games.

use std::sync::Arc;

use rand::Rng;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::domain::deck::new_deck;
use crate::domain::state::{
    initial_pawns, Game, GamePhase, GameResult, GameSettings, GameState, Seat, MAX_SEATS,
    MIN_SEATS,
};
use crate::errors::GameError;
use crate::store::{require_game, GameStore};

pub const ABORT_REASON_HOST_LEFT: &str = "host_left";

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn GameStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Create a lobby with the caller in seat 0 and the remaining seats open.
    pub async fn host(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        max_seats: u8,
        deck_seed: Option<u64>,
    ) -> Result<Game, GameError> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&max_seats) {
            return Err(GameError::validation(format!(
                "maxSeats must be between {MIN_SEATS} and {MAX_SEATS}, got {max_seats}"
            )));
        }
        if self.store.get_active_game(user_id).await?.is_some() {
            return Err(GameError::AlreadyInGame);
        }

        let display_name = display_name.unwrap_or(user_id);
        let game_id = new_game_id();
        let now = OffsetDateTime::now_utc();
        let mut seats = Vec::with_capacity(max_seats as usize);
        seats.push(Seat::human(0, user_id, display_name));
        for index in 1..max_seats {
            seats.push(Seat::open(index));
        }

        let game = self
            .store
            .create_game(Game {
                game_id: game_id.clone(),
                host_id: user_id.to_string(),
                host_name: display_name.to_string(),
                created_at: now,
                updated_at: now,
                ended_at: None,
                phase: GamePhase::Lobby,
                settings: GameSettings {
                    max_seats,
                    deck_seed,
                },
                seats,
                state: None,
                aborted_reason: None,
                lock_version: 0,
            })
            .await?;
        self.store.set_active_game(user_id, Some(&game_id)).await?;
        info!(%game_id, user_id, "lobby hosted");
        Ok(game)
    }

    /// Lobby games with at least one open human seat.
    pub async fn list_joinable(&self) -> Result<Vec<Game>, GameError> {
        let games = self.store.list_lobby_games().await?;
        Ok(games
            .into_iter()
            .filter(|g| g.seats.iter().any(Seat::is_open_human))
            .collect())
    }

    /// Claim the lowest open seat in a lobby; against an active game, a
    /// previous occupant of a bot-converted seat is rebound instead.
    pub async fn join(
        &self,
        user_id: &str,
        game_id: &str,
        display_name: Option<&str>,
    ) -> Result<Game, GameError> {
        match self.store.get_active_game(user_id).await? {
            Some(existing) if existing == game_id => {
                // Idempotent re-join of the game the user is already in.
                return require_game(self.store.as_ref(), game_id).await;
            }
            Some(_) => return Err(GameError::AlreadyInGame),
            None => {}
        }

        let display_name = display_name.unwrap_or(user_id).to_string();
        let user = user_id.to_string();
        let game = self
            .store
            .update_game(game_id, &mut |game| match game.phase {
                GamePhase::Lobby => {
                    let seat = game
                        .seats
                        .iter_mut()
                        .find(|s| s.is_open_human())
                        .ok_or(GameError::SeatNotOpen)?;
                    seat.player_id = Some(user.clone());
                    seat.display_name = Some(display_name.clone());
                    seat.status = crate::domain::state::SeatStatus::Joined;
                    Ok(())
                }
                GamePhase::Active => Self::rejoin_seat(game, &user, &display_name),
                GamePhase::Finished | GamePhase::Aborted => Err(GameError::LobbyOnly),
            })
            .await?;
        self.store.set_active_game(user_id, Some(game_id)).await?;
        info!(game_id, user_id, "user joined");
        Ok(game)
    }

    /// Rebind a returning user to the bot seat they vacated.
    fn rejoin_seat(game: &mut Game, user_id: &str, display_name: &str) -> Result<(), GameError> {
        if game.state.as_ref().map(|s| s.result) != Some(GameResult::Active) {
            return Err(GameError::ActiveOnly);
        }
        let seat = game
            .seats
            .iter_mut()
            .find(|s| s.is_bot && s.last_player_id.as_deref() == Some(user_id))
            .ok_or(GameError::LobbyOnly)?;
        seat.is_bot = false;
        seat.status = crate::domain::state::SeatStatus::Joined;
        seat.player_id = Some(user_id.to_string());
        seat.display_name = Some(display_name.to_string());
        seat.last_player_id = None;
        Ok(())
    }

    /// Host-only, lobby-only seat type toggle. Seat 0 is immutable.
    pub async fn configure_seat(
        &self,
        user_id: &str,
        game_id: &str,
        seat_index: u8,
        is_bot: bool,
    ) -> Result<Game, GameError> {
        let mut cleared_player: Option<String> = None;
        let user = user_id.to_string();
        let game = self
            .store
            .update_game(game_id, &mut |game| {
                cleared_player = None;
                if !game.is_host(&user) {
                    return Err(GameError::NotHost);
                }
                if game.phase != GamePhase::Lobby {
                    return Err(GameError::LobbyOnly);
                }
                let seat = seat_checked(game, seat_index)?;
                cleared_player = seat.player_id.clone();
                if is_bot {
                    seat.convert_to_bot(false);
                } else {
                    *seat = Seat::open(seat_index);
                }
                Ok(())
            })
            .await?;
        if let Some(player) = cleared_player {
            self.store.set_active_game(&player, None).await?;
        }
        Ok(game)
    }

    /// Host-only kick: the seat is filled by a bot. Allowed in lobby and
    /// active games alike.
    pub async fn kick(
        &self,
        user_id: &str,
        game_id: &str,
        seat_index: u8,
    ) -> Result<Game, GameError> {
        let mut kicked_player: Option<String> = None;
        let user = user_id.to_string();
        let game = self
            .store
            .update_game(game_id, &mut |game| {
                kicked_player = None;
                if !game.is_host(&user) {
                    return Err(GameError::NotHost);
                }
                if matches!(game.phase, GamePhase::Finished | GamePhase::Aborted) {
                    return Err(GameError::GameOver);
                }
                let seat = seat_checked(game, seat_index)?;
                kicked_player = seat.player_id.clone();
                // A kicked user does not keep a rejoin claim on the seat.
                seat.convert_to_bot(false);
                Ok(())
            })
            .await?;
        if let Some(player) = kicked_player {
            self.store.set_active_game(&player, None).await?;
        }
        info!(game_id, seat_index, "seat kicked to bot");
        Ok(game)
    }

    /// Leave a game. A departing host disposes of a lobby, or aborts an
    /// active game; a departing non-host hands the seat to a bot.
    ///
    /// Returns the surviving game record, or `None` when the record was
    /// disposed of.
    pub async fn leave(&self, user_id: &str, game_id: &str) -> Result<Option<Game>, GameError> {
        let game = require_game(self.store.as_ref(), game_id).await?;

        if game.is_host(user_id) {
            return self.host_leave(game).await;
        }

        if game.seat_of(user_id).is_none() {
            return Err(GameError::NotInGame);
        }
        let user = user_id.to_string();
        let updated = self
            .store
            .update_game(game_id, &mut |game| {
                if let Some(seat) = game.seat_of_mut(&user) {
                    seat.convert_to_bot(true);
                }
                Ok(())
            })
            .await?;
        self.store.set_active_game(user_id, None).await?;
        info!(game_id, user_id, "non-host left, seat handed to bot");
        Ok(Some(updated))
    }

    async fn host_leave(&self, game: Game) -> Result<Option<Game>, GameError> {
        let participants: Vec<String> = game
            .seats
            .iter()
            .filter_map(|s| s.player_id.clone())
            .collect();

        match game.phase {
            GamePhase::Lobby => {
                self.store.delete_game(&game.game_id).await?;
                for player in participants {
                    self.store.set_active_game(&player, None).await?;
                }
                info!(game_id = %game.game_id, "lobby disposed by host");
                Ok(None)
            }
            GamePhase::Active => {
                let updated = self
                    .store
                    .update_game(&game.game_id, &mut |game| {
                        game.phase = GamePhase::Aborted;
                        game.aborted_reason = Some(ABORT_REASON_HOST_LEFT.to_string());
                        game.ended_at = Some(OffsetDateTime::now_utc());
                        if let Some(state) = game.state.as_mut() {
                            state.result = GameResult::Aborted;
                        }
                        Ok(())
                    })
                    .await?;
                for player in participants {
                    self.store.set_active_game(&player, None).await?;
                }
                info!(game_id = %game.game_id, "active game aborted by host leave");
                Ok(Some(updated))
            }
            GamePhase::Finished | GamePhase::Aborted => {
                self.store.set_active_game(&game.host_id, None).await?;
                Ok(Some(game))
            }
        }
    }

    /// Transition a lobby to active: fix the deck seed, shuffle, and seat
    /// every pawn in Start.
    pub async fn start(&self, user_id: &str, game_id: &str) -> Result<Game, GameError> {
        let user = user_id.to_string();
        let game = self
            .store
            .update_game(game_id, &mut |game| {
                if !game.is_host(&user) {
                    return Err(GameError::NotHost);
                }
                if game.phase != GamePhase::Lobby {
                    return Err(GameError::LobbyOnly);
                }
                if game.occupied_seats() < MIN_SEATS as usize {
                    return Err(GameError::InsufficientPlayers);
                }
                if game.human_seats() == 0 {
                    return Err(GameError::NoHumans);
                }

                // Fix an effective seed so rebuilds and previews replay
                // deterministically from persisted state.
                let seed = game
                    .settings
                    .deck_seed
                    .unwrap_or_else(|| rand::thread_rng().gen());
                game.settings.deck_seed = Some(seed);

                game.state = Some(GameState {
                    turn_number: 0,
                    current_seat_index: 0,
                    deck: new_deck(seed),
                    discard_pile: Vec::new(),
                    pawns: initial_pawns(&game.game_id, &game.seats),
                    winner_seat_index: None,
                    result: GameResult::Active,
                    deck_epoch: 0,
                });
                game.phase = GamePhase::Active;
                Ok(())
            })
            .await?;
        info!(game_id, "game started");
        Ok(game)
    }

    /// The caller's current game, if any.
    pub async fn active_game_for_user(&self, user_id: &str) -> Result<Option<Game>, GameError> {
        let Some(game_id) = self.store.get_active_game(user_id).await? else {
            return Ok(None);
        };
        self.store.get_game(&game_id).await
    }
}

fn seat_checked(game: &mut Game, seat_index: u8) -> Result<&mut Seat, GameError> {
    if seat_index as usize >= game.seats.len() {
        return Err(GameError::InvalidSeat);
    }
    if seat_index == 0 {
        return Err(GameError::CannotToggleHostSeat);
    }
    Ok(&mut game.seats[seat_index as usize])
}

fn new_game_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
