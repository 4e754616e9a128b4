//! Move selector: resolves a client payload against a set of legal moves
//! into exactly one move, or rejects with a typed error.

use serde::{Deserialize, Serialize};

use crate::domain::moves::{Direction, Move};
use crate::errors::GameError;

/// Client payload accompanying a play request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientMovePayload {
    pub move_index: Option<usize>,
    #[serde(rename = "move")]
    pub descriptor: Option<MoveDescriptor>,
    /// Follow-up selection for the extra card granted by a 2.
    pub secondary: Option<Box<ClientMovePayload>>,
}

impl ClientMovePayload {
    /// No primary selection information at all.
    pub fn is_empty(&self) -> bool {
        self.move_index.is_none() && self.descriptor.is_none()
    }
}

/// Partial move description; every present field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoveDescriptor {
    pub pawn_id: Option<String>,
    pub target_pawn_id: Option<String>,
    pub secondary_pawn_id: Option<String>,
    pub direction: Option<Direction>,
    pub steps: Option<u8>,
    pub secondary_direction: Option<Direction>,
    pub secondary_steps: Option<u8>,
}

impl MoveDescriptor {
    fn matches(&self, mv: &Move) -> bool {
        if let Some(pawn_id) = &self.pawn_id {
            if &mv.pawn_id != pawn_id {
                return false;
            }
        }
        if let Some(target) = &self.target_pawn_id {
            if mv.target_pawn_id.as_ref() != Some(target) {
                return false;
            }
        }
        if let Some(secondary) = &self.secondary_pawn_id {
            if mv.secondary_pawn_id.as_ref() != Some(secondary) {
                return false;
            }
        }
        if let Some(direction) = self.direction {
            if mv.direction != Some(direction) {
                return false;
            }
        }
        if let Some(steps) = self.steps {
            if mv.steps != Some(steps) {
                return false;
            }
        }
        if let Some(direction) = self.secondary_direction {
            if mv.secondary_direction != Some(direction) {
                return false;
            }
        }
        if let Some(steps) = self.secondary_steps {
            if mv.secondary_steps != Some(steps) {
                return false;
            }
        }
        true
    }
}

/// Pick exactly one move from `moves` according to `payload`.
///
/// Evaluation order: empty set, implicit single move, index selection,
/// descriptor filtering, then selection-required.
pub fn select_move<'a>(
    moves: &'a [Move],
    payload: &ClientMovePayload,
) -> Result<&'a Move, GameError> {
    if moves.is_empty() {
        return Err(GameError::NoLegalMoves);
    }
    if payload.is_empty() && moves.len() == 1 {
        return Ok(&moves[0]);
    }
    if let Some(index) = payload.move_index {
        if let Some(mv) = moves.get(index) {
            return Ok(mv);
        }
    }
    if let Some(descriptor) = &payload.descriptor {
        let mut matches = moves.iter().filter(|m| descriptor.matches(m));
        return match (matches.next(), matches.next()) {
            (Some(mv), None) => Ok(mv),
            (None, _) => Err(GameError::InvalidMoveSelectionNoMatch),
            (Some(_), Some(_)) => Err(GameError::InvalidMoveSelectionAmbiguous),
        };
    }
    if moves.len() > 1 {
        return Err(GameError::MoveSelectionRequired);
    }
    Ok(&moves[0])
}
