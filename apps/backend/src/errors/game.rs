//! Domain-level error type used across the rules engine, services, and store.
//!
//! This error type is HTTP-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `GameError` using the
//! provided `From<GameError> for AppError` implementation.
//!
//! Every variant maps 1:1 to a stable snake_case code that appears on the
//! wire. Add new codes here; never pass ad-hoc strings as error codes.

use thiserror::Error;

/// Central domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    // Session & lobby preconditions
    #[error("user has no active game")]
    NoActiveGame,
    #[error("user already has an active game")]
    AlreadyInGame,
    #[error("caller is not the host of this game")]
    NotHost,
    #[error("caller does not occupy a seat in this game")]
    NotInGame,
    #[error("it is not the caller's turn")]
    NotYourTurn,
    #[error("game has not been started")]
    GameNotStarted,
    #[error("game is already over")]
    GameOver,
    #[error("no open seat is available")]
    SeatNotOpen,
    #[error("seat index is out of range")]
    InvalidSeat,
    #[error("the host seat cannot be reconfigured")]
    CannotToggleHostSeat,
    #[error("at least two occupied seats are required")]
    InsufficientPlayers,
    #[error("at least one human seat is required")]
    NoHumans,
    #[error("operation is only valid in the lobby phase")]
    LobbyOnly,
    #[error("operation is only valid while the game is active")]
    ActiveOnly,

    // Rules engine
    #[error("move is not legal in the current state")]
    IllegalMove,
    #[error("no legal moves exist for the drawn card")]
    NoLegalMoves,
    #[error("game state is internally inconsistent: {0}")]
    InvalidState(String),

    // Move selector
    #[error("multiple legal moves exist; a selection is required")]
    MoveSelectionRequired,
    #[error("move selection matched no legal move")]
    InvalidMoveSelectionNoMatch,
    #[error("move selection matched more than one legal move")]
    InvalidMoveSelectionAmbiguous,

    // Store
    #[error("concurrent update conflict; retries exhausted")]
    Conflict,
    #[error("game not found")]
    NotFound,

    // Request validation
    #[error("validation error: {0}")]
    Validation(String),
}

impl GameError {
    /// Stable snake_case code for this error, as it appears on the wire.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoActiveGame => "no_active_game",
            Self::AlreadyInGame => "already_in_game",
            Self::NotHost => "not_host",
            Self::NotInGame => "not_in_game",
            Self::NotYourTurn => "not_your_turn",
            Self::GameNotStarted => "game_not_started",
            Self::GameOver => "game_over",
            Self::SeatNotOpen => "seat_not_open",
            Self::InvalidSeat => "invalid_seat",
            Self::CannotToggleHostSeat => "cannot_toggle_host_seat",
            Self::InsufficientPlayers => "insufficient_players",
            Self::NoHumans => "no_humans",
            Self::LobbyOnly => "lobby_only",
            Self::ActiveOnly => "active_only",
            Self::IllegalMove => "illegal_move",
            Self::NoLegalMoves => "no_legal_moves",
            Self::InvalidState(_) => "invalid_state",
            Self::MoveSelectionRequired => "move_selection_required",
            Self::InvalidMoveSelectionNoMatch => "invalid_move_selection_no_match",
            Self::InvalidMoveSelectionAmbiguous => "invalid_move_selection_ambiguous",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Validation(_) => "validation_error",
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState(detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(GameError::NoActiveGame.code(), "no_active_game");
        assert_eq!(GameError::AlreadyInGame.code(), "already_in_game");
        assert_eq!(GameError::NotHost.code(), "not_host");
        assert_eq!(GameError::NotYourTurn.code(), "not_your_turn");
        assert_eq!(GameError::GameNotStarted.code(), "game_not_started");
        assert_eq!(GameError::GameOver.code(), "game_over");
        assert_eq!(GameError::SeatNotOpen.code(), "seat_not_open");
        assert_eq!(
            GameError::CannotToggleHostSeat.code(),
            "cannot_toggle_host_seat"
        );
        assert_eq!(GameError::InsufficientPlayers.code(), "insufficient_players");
        assert_eq!(GameError::NoHumans.code(), "no_humans");
        assert_eq!(GameError::IllegalMove.code(), "illegal_move");
        assert_eq!(GameError::NoLegalMoves.code(), "no_legal_moves");
        assert_eq!(
            GameError::MoveSelectionRequired.code(),
            "move_selection_required"
        );
        assert_eq!(
            GameError::InvalidMoveSelectionNoMatch.code(),
            "invalid_move_selection_no_match"
        );
        assert_eq!(
            GameError::InvalidMoveSelectionAmbiguous.code(),
            "invalid_move_selection_ambiguous"
        );
        assert_eq!(GameError::Conflict.code(), "conflict");
        assert_eq!(GameError::NotFound.code(), "not_found");
    }

}
