//! Turn coordinator: draw, enumerate, select, apply, and advance, for
//! humans and bots alike.

use std::sync::Arc;

use rand::seq::SliceRandom;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::domain::cards::Card;
use crate::domain::moves::{apply_move, legal_moves, Move};
use crate::domain::selector::{select_move, ClientMovePayload};
use crate::domain::snapshot::{legal_movers_preview, LegalMoversView};
use crate::domain::state::{Game, GamePhase, GameResult};
use crate::domain::{deck, state::GameState};
use crate::errors::GameError;
use crate::store::{diff_pawns, require_game, GameStore, MoveRecord};

/// Minimum wall-clock gap between committed updates and a bot step, so bot
/// turns stay visible to polling clients.
pub const BOT_STEP_MIN_GAP: Duration = Duration::seconds(1);

enum MoveChoice<'a> {
    Human(&'a ClientMovePayload),
    Bot,
}

#[derive(Clone)]
pub struct TurnService {
    store: Arc<dyn GameStore>,
}

impl TurnService {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Play one full turn for the authenticated human: draw, resolve the
    /// payload to a move, apply it, handle the card-2 extra draw, advance.
    ///
    /// Selection failures abort the whole transaction; an empty legal-move
    /// set still commits the draw and advances.
    pub async fn play_human(
        &self,
        user_id: &str,
        game_id: &str,
        payload: &ClientMovePayload,
    ) -> Result<Game, GameError> {
        let user = user_id.to_string();
        let mut records: Vec<MoveRecord> = Vec::new();
        let game = self
            .store
            .update_game(game_id, &mut |game| {
                records.clear();
                let state = active_state(game)?;
                let current = state.current_seat_index;
                let seat = game.seat_of(&user).ok_or(GameError::NotInGame)?;
                if seat.index != current {
                    return Err(GameError::NotYourTurn);
                }
                run_turn(
                    game,
                    current,
                    Some(user.clone()),
                    &MoveChoice::Human(payload),
                    &mut records,
                )
            })
            .await?;
        for record in records {
            self.store.append_move(game_id, record).await?;
        }
        info!(game_id, user_id, "human turn committed");
        Ok(game)
    }

    /// Advance the current bot seat by one turn with a uniformly random
    /// legal move. Steps taken less than a second after the last update are
    /// skipped so clients can watch the game unfold.
    pub async fn bot_step(&self, game_id: &str) -> Result<Game, GameError> {
        let game = require_game(self.store.as_ref(), game_id).await?;
        if game.phase == GamePhase::Active
            && OffsetDateTime::now_utc() - game.updated_at < BOT_STEP_MIN_GAP
        {
            debug!(game_id, "bot step skipped; update too recent");
            return Ok(game);
        }

        let mut records: Vec<MoveRecord> = Vec::new();
        let game = self
            .store
            .update_game(game_id, &mut |game| {
                records.clear();
                let state = active_state(game)?;
                let current = state.current_seat_index;
                let seat = game
                    .seats
                    .get(current as usize)
                    .ok_or_else(|| GameError::invalid_state("current seat out of range"))?;
                if !seat.is_bot {
                    return Err(GameError::NotYourTurn);
                }
                run_turn(game, current, None, &MoveChoice::Bot, &mut records)
            })
            .await?;
        for record in records {
            self.store.append_move(game_id, record).await?;
        }
        info!(game_id, "bot turn committed");
        Ok(game)
    }

    /// Non-mutating preview of the next draw for the current seat.
    pub async fn preview(
        &self,
        user_id: &str,
        game_id: &str,
    ) -> Result<LegalMoversView, GameError> {
        let game = require_game(self.store.as_ref(), game_id).await?;
        legal_movers_preview(&game, user_id)
    }

    pub async fn move_history(&self, game_id: &str) -> Result<Vec<MoveRecord>, GameError> {
        self.store.moves_for_game(game_id).await
    }
}

/// Phase and result preconditions shared by human and bot turns.
fn active_state(game: &Game) -> Result<&GameState, GameError> {
    match game.phase {
        GamePhase::Lobby => return Err(GameError::GameNotStarted),
        GamePhase::Finished | GamePhase::Aborted => return Err(GameError::GameOver),
        GamePhase::Active => {}
    }
    let state = game.require_state()?;
    if state.result != GameResult::Active {
        return Err(GameError::GameOver);
    }
    Ok(state)
}

fn run_turn(
    game: &mut Game,
    seat_index: u8,
    player_id: Option<String>,
    choice: &MoveChoice<'_>,
    records: &mut Vec<MoveRecord>,
) -> Result<(), GameError> {
    let seed = game
        .settings
        .deck_seed
        .ok_or_else(|| GameError::invalid_state("active game has no deck seed"))?;
    let seats = game.seats.clone();
    let state = game.require_state_mut()?;

    let card = deck::draw(state, seed);
    let moves = legal_moves(state, seat_index, card);
    if moves.is_empty() {
        // The turn is forfeited, but the draw still counts.
        records.push(record_for(state, seat_index, &player_id, card, Vec::new()));
    } else {
        let chosen = choose_primary(choice, &moves)?.clone();
        let before = state.clone();
        *state = apply_move(&before, &chosen)?;
        records.push(record_for(
            state,
            seat_index,
            &player_id,
            card,
            diff_pawns(&before, state),
        ));
    }
    deck::discard(state, card);

    // A 2 keeps the seat for one immediate extra draw.
    if card == Card::Two && state.result == GameResult::Active {
        let extra = deck::draw(state, seed);
        let moves = legal_moves(state, seat_index, extra);
        if moves.is_empty() {
            records.push(record_for(state, seat_index, &player_id, extra, Vec::new()));
        } else {
            let chosen = choose_extra(choice, &moves)?.clone();
            let before = state.clone();
            *state = apply_move(&before, &chosen)?;
            records.push(record_for(
                state,
                seat_index,
                &player_id,
                extra,
                diff_pawns(&before, state),
            ));
        }
        deck::discard(state, extra);
    }

    if state.result == GameResult::Active {
        state.advance_turn(&seats);
    }

    if state.result == GameResult::Win {
        game.phase = GamePhase::Finished;
        game.ended_at = Some(OffsetDateTime::now_utc());
    }
    Ok(())
}

fn choose_primary<'m>(
    choice: &MoveChoice<'_>,
    moves: &'m [Move],
) -> Result<&'m Move, GameError> {
    match choice {
        MoveChoice::Human(payload) => select_move(moves, payload),
        MoveChoice::Bot => pick_random(moves),
    }
}

/// Selection for the extra card of a 2: an explicit secondary payload wins;
/// otherwise exactly one legal option is required.
fn choose_extra<'m>(choice: &MoveChoice<'_>, moves: &'m [Move]) -> Result<&'m Move, GameError> {
    match choice {
        MoveChoice::Human(payload) => match payload.secondary.as_deref() {
            Some(secondary) => select_move(moves, secondary),
            None if moves.len() == 1 => Ok(&moves[0]),
            None => Err(GameError::MoveSelectionRequired),
        },
        MoveChoice::Bot => pick_random(moves),
    }
}

fn pick_random(moves: &[Move]) -> Result<&Move, GameError> {
    moves
        .choose(&mut rand::thread_rng())
        .ok_or(GameError::NoLegalMoves)
}

fn record_for(
    state: &GameState,
    seat_index: u8,
    player_id: &Option<String>,
    card: Card,
    moved_pawns: Vec<crate::store::MovedPawn>,
) -> MoveRecord {
    MoveRecord {
        index: state.turn_number,
        seat_index,
        player_id: player_id.clone(),
        card,
        moved_pawns,
        created_at: OffsetDateTime::now_utc(),
    }
}
