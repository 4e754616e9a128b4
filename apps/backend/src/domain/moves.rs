//! Rules engine: legal-move enumeration and deterministic move application.
//!
//! Enumeration simulates every candidate against a cloned state so that the
//! emitted descriptors carry fully resolved destinations (post slide, divert,
//! and bump). Application never trusts those destinations for effects; it
//! recomputes the resolution and uses the descriptor's destination only to
//! disambiguate the divert-or-stay choice at the mover's own safety entry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::board::{
    backward_landing, forward_landings, slide_at, start_exit, BackwardLanding, ForwardLanding,
};
use crate::domain::cards::Card;
use crate::domain::state::{GameState, Pawn, Position, PositionKind};
use crate::errors::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

/// A complete description of how one or two pawns transition under a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub card: Card,
    pub seat_index: u8,
    pub pawn_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u8>,
    /// Target pawn for Sorry! and the 11 switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pawn_id: Option<String>,
    /// Second leg of a split 7.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_pawn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_steps: Option<u8>,
    /// Resolved primary destination, after slides, diverts, and bumps.
    pub dest_type: PositionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_index: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_dest_type: Option<PositionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_dest_index: Option<u8>,
}

impl Move {
    fn simple(
        card: Card,
        seat_index: u8,
        pawn_id: &str,
        direction: Direction,
        steps: u8,
        dest: Position,
    ) -> Self {
        Self {
            card,
            seat_index,
            pawn_id: pawn_id.to_string(),
            direction: Some(direction),
            steps: Some(steps),
            target_pawn_id: None,
            secondary_pawn_id: None,
            secondary_direction: None,
            secondary_steps: None,
            dest_type: dest.kind(),
            dest_index: dest.index(),
            secondary_dest_type: None,
            secondary_dest_index: None,
        }
    }

    pub fn matches_dest(&self, pos: Position) -> bool {
        self.dest_type == pos.kind() && self.dest_index == pos.index()
    }

    pub fn matches_secondary_dest(&self, pos: Position) -> bool {
        self.secondary_dest_type == Some(pos.kind()) && self.secondary_dest_index == pos.index()
    }
}

/// Fully resolved outcome of landing one pawn: final position plus every
/// pawn returned to its Start along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    dest: Position,
    bumped: Vec<String>,
}

/// Resolve a pawn landing on an outer-track space: apply slides (any color),
/// the slide-into-safety house rule, destination bumps, and the self-bump
/// prohibition. `None` means the landing is illegal.
fn resolve_track_landing(
    state: &GameState,
    mover_seat: u8,
    mover_id: &str,
    index: u8,
    forward: bool,
) -> Option<Resolution> {
    if let Some(slide) = slide_at(index) {
        let spaces = slide.spaces();
        if forward && slide.into_safety && slide.owner_seat == mover_seat {
            // Own first slide carries the pawn past its safety entry; the
            // house rule places it on Safety[0] instead.
            if state.pawn_in_safety(mover_seat, 0).is_some() {
                return None;
            }
            let bumped = pawns_on_spaces(state, &spaces, mover_id);
            return Some(Resolution {
                dest: Position::Safety { index: 0 },
                bumped,
            });
        }

        let end = slide.end();
        if let Some(occupant) = state.pawn_on_track(end) {
            if occupant.pawn_id != mover_id && occupant.seat_index == mover_seat {
                return None;
            }
        }
        let bumped = pawns_on_spaces(state, &spaces, mover_id);
        return Some(Resolution {
            dest: Position::Track { index: end },
            bumped,
        });
    }

    match state.pawn_on_track(index) {
        Some(occupant) if occupant.pawn_id == mover_id => Some(Resolution {
            dest: Position::Track { index },
            bumped: Vec::new(),
        }),
        Some(occupant) if occupant.seat_index == mover_seat => None,
        Some(occupant) => Some(Resolution {
            dest: Position::Track { index },
            bumped: vec![occupant.pawn_id.clone()],
        }),
        None => Some(Resolution {
            dest: Position::Track { index },
            bumped: Vec::new(),
        }),
    }
}

/// Every pawn (own and opponent alike) occupying a slide space is swept back
/// to its Start; the sliding pawn itself is exempt.
fn pawns_on_spaces(state: &GameState, spaces: &[u8], mover_id: &str) -> Vec<String> {
    state
        .pawns
        .iter()
        .filter(|p| p.pawn_id != mover_id)
        .filter(|p| matches!(p.position, Position::Track { index } if spaces.contains(&index)))
        .map(|p| p.pawn_id.clone())
        .collect()
}

fn resolve_safety_landing(state: &GameState, seat: u8, index: u8) -> Option<Resolution> {
    if state.pawn_in_safety(seat, index).is_some() {
        return None;
    }
    Some(Resolution {
        dest: Position::Safety { index },
        bumped: Vec::new(),
    })
}

/// All legal resolved outcomes of moving `pawn` forward `steps`.
fn resolve_forward(state: &GameState, pawn: &Pawn, steps: u8) -> Vec<Resolution> {
    forward_landings(pawn.seat_index, pawn.position, steps)
        .into_iter()
        .filter_map(|landing| match landing {
            ForwardLanding::Track(index) => {
                resolve_track_landing(state, pawn.seat_index, &pawn.pawn_id, index, true)
            }
            ForwardLanding::Safety(index) => {
                resolve_safety_landing(state, pawn.seat_index, index)
            }
            ForwardLanding::Home => Some(Resolution {
                dest: Position::Home,
                bumped: Vec::new(),
            }),
        })
        .collect()
}

fn resolve_backward(state: &GameState, pawn: &Pawn, steps: u8) -> Option<Resolution> {
    match backward_landing(pawn.seat_index, pawn.position, steps)? {
        BackwardLanding::Track(index) => {
            resolve_track_landing(state, pawn.seat_index, &pawn.pawn_id, index, false)
        }
        BackwardLanding::Safety(index) => resolve_safety_landing(state, pawn.seat_index, index),
    }
}

/// A pawn leaving Start is placed on its start-exit space, subject to the
/// usual landing rules.
fn resolve_leave_start(state: &GameState, pawn: &Pawn) -> Option<Resolution> {
    if pawn.position != Position::Start {
        return None;
    }
    resolve_track_landing(
        state,
        pawn.seat_index,
        &pawn.pawn_id,
        start_exit(pawn.seat_index),
        true,
    )
}

/// Sorry!: a Start pawn lands on the target's track space. Slides apply, but
/// the move may not end in a Safety Zone.
fn resolve_sorry(state: &GameState, pawn: &Pawn, target: &Pawn) -> Option<Resolution> {
    let Position::Track { index } = target.position else {
        return None;
    };
    let resolution = resolve_track_landing(state, pawn.seat_index, &pawn.pawn_id, index, true)?;
    match resolution.dest {
        Position::Track { .. } => Some(resolution),
        _ => None,
    }
}

fn apply_resolution(state: &mut GameState, mover_id: &str, resolution: &Resolution) {
    for bumped_id in &resolution.bumped {
        if let Some(p) = state.pawn_mut(bumped_id) {
            p.position = Position::Start;
        }
    }
    if let Some(p) = state.pawn_mut(mover_id) {
        p.position = resolution.dest;
    }
}

fn seat_pawns(state: &GameState, seat_index: u8) -> Vec<Pawn> {
    state.pawns_for_seat(seat_index).cloned().collect()
}

fn collect_forward(
    moves: &mut Vec<Move>,
    state: &GameState,
    pawns: &[Pawn],
    card: Card,
    seat_index: u8,
    steps: u8,
) {
    for pawn in pawns {
        if !pawn.position.is_movable() {
            continue;
        }
        for resolution in resolve_forward(state, pawn, steps) {
            moves.push(Move::simple(
                card,
                seat_index,
                &pawn.pawn_id,
                Direction::Forward,
                steps,
                resolution.dest,
            ));
        }
    }
}

fn collect_backward(
    moves: &mut Vec<Move>,
    state: &GameState,
    pawns: &[Pawn],
    card: Card,
    seat_index: u8,
    steps: u8,
) {
    for pawn in pawns {
        if !pawn.position.is_movable() {
            continue;
        }
        if let Some(resolution) = resolve_backward(state, pawn, steps) {
            moves.push(Move::simple(
                card,
                seat_index,
                &pawn.pawn_id,
                Direction::Backward,
                steps,
                resolution.dest,
            ));
        }
    }
}

fn collect_leave_start(
    moves: &mut Vec<Move>,
    state: &GameState,
    pawns: &[Pawn],
    card: Card,
    seat_index: u8,
    steps: u8,
) {
    for pawn in pawns {
        if pawn.position != Position::Start {
            continue;
        }
        if let Some(resolution) = resolve_leave_start(state, pawn) {
            moves.push(Move::simple(
                card,
                seat_index,
                &pawn.pawn_id,
                Direction::Forward,
                steps,
                resolution.dest,
            ));
        }
    }
}

fn collect_splits(moves: &mut Vec<Move>, state: &GameState, pawns: &[Pawn], seat_index: u8) {
    let mut seen: HashSet<(String, u8, String, u8, Position, Position)> = HashSet::new();
    for first_steps in 1..=6u8 {
        let second_steps = 7 - first_steps;
        for first in pawns {
            if !first.position.is_movable() {
                continue;
            }
            for first_resolution in resolve_forward(state, first, first_steps) {
                let mut mid = state.clone();
                apply_resolution(&mut mid, &first.pawn_id, &first_resolution);
                for second in pawns {
                    if second.pawn_id == first.pawn_id {
                        continue;
                    }
                    let Some(second_mid) = mid.pawn(&second.pawn_id).cloned() else {
                        continue;
                    };
                    if !second_mid.position.is_movable() {
                        continue;
                    }
                    for second_resolution in resolve_forward(&mid, &second_mid, second_steps) {
                        let key = (
                            first.pawn_id.clone(),
                            first_steps,
                            second.pawn_id.clone(),
                            second_steps,
                            first_resolution.dest,
                            second_resolution.dest,
                        );
                        if !seen.insert(key) {
                            continue;
                        }
                        moves.push(Move {
                            card: Card::Seven,
                            seat_index,
                            pawn_id: first.pawn_id.clone(),
                            direction: Some(Direction::Forward),
                            steps: Some(first_steps),
                            target_pawn_id: None,
                            secondary_pawn_id: Some(second.pawn_id.clone()),
                            secondary_direction: Some(Direction::Forward),
                            secondary_steps: Some(second_steps),
                            dest_type: first_resolution.dest.kind(),
                            dest_index: first_resolution.dest.index(),
                            secondary_dest_type: Some(second_resolution.dest.kind()),
                            secondary_dest_index: second_resolution.dest.index(),
                        });
                    }
                }
            }
        }
    }
}

fn collect_switches(moves: &mut Vec<Move>, state: &GameState, pawns: &[Pawn], seat_index: u8) {
    for pawn in pawns {
        if !matches!(pawn.position, Position::Track { .. }) {
            continue;
        }
        for target in &state.pawns {
            if target.seat_index == seat_index {
                continue;
            }
            if !matches!(target.position, Position::Track { .. }) {
                continue;
            }
            moves.push(Move {
                card: Card::Eleven,
                seat_index,
                pawn_id: pawn.pawn_id.clone(),
                direction: None,
                steps: None,
                target_pawn_id: Some(target.pawn_id.clone()),
                secondary_pawn_id: None,
                secondary_direction: None,
                secondary_steps: None,
                dest_type: target.position.kind(),
                dest_index: target.position.index(),
                secondary_dest_type: None,
                secondary_dest_index: None,
            });
        }
    }
}

fn collect_sorry(moves: &mut Vec<Move>, state: &GameState, pawns: &[Pawn], seat_index: u8) {
    for pawn in pawns {
        if pawn.position != Position::Start {
            continue;
        }
        for target in &state.pawns {
            if target.seat_index == seat_index {
                continue;
            }
            let Some(resolution) = resolve_sorry(state, pawn, target) else {
                continue;
            };
            moves.push(Move {
                card: Card::Sorry,
                seat_index,
                pawn_id: pawn.pawn_id.clone(),
                direction: Some(Direction::Forward),
                steps: None,
                target_pawn_id: Some(target.pawn_id.clone()),
                secondary_pawn_id: None,
                secondary_direction: None,
                secondary_steps: None,
                dest_type: resolution.dest.kind(),
                dest_index: resolution.dest.index(),
                secondary_dest_type: None,
                secondary_dest_index: None,
            });
        }
    }
}

/// Enumerate every distinct legal move for `seat_index` under `card`.
pub fn legal_moves(state: &GameState, seat_index: u8, card: Card) -> Vec<Move> {
    let pawns = seat_pawns(state, seat_index);
    let mut moves = Vec::new();

    match card {
        Card::One => {
            collect_leave_start(&mut moves, state, &pawns, card, seat_index, 1);
            collect_forward(&mut moves, state, &pawns, card, seat_index, 1);
        }
        Card::Two => {
            collect_leave_start(&mut moves, state, &pawns, card, seat_index, 2);
            collect_forward(&mut moves, state, &pawns, card, seat_index, 2);
        }
        Card::Three => collect_forward(&mut moves, state, &pawns, card, seat_index, 3),
        Card::Four => collect_backward(&mut moves, state, &pawns, card, seat_index, 4),
        Card::Five => collect_forward(&mut moves, state, &pawns, card, seat_index, 5),
        Card::Seven => {
            collect_forward(&mut moves, state, &pawns, card, seat_index, 7);
            collect_splits(&mut moves, state, &pawns, seat_index);
        }
        Card::Eight => collect_forward(&mut moves, state, &pawns, card, seat_index, 8),
        Card::Ten => {
            collect_forward(&mut moves, state, &pawns, card, seat_index, 10);
            if moves.is_empty() {
                // Forward 10 is impossible; the card forces a single step back.
                collect_backward(&mut moves, state, &pawns, card, seat_index, 1);
            }
        }
        Card::Eleven => {
            collect_forward(&mut moves, state, &pawns, card, seat_index, 11);
            collect_switches(&mut moves, state, &pawns, seat_index);
        }
        Card::Twelve => collect_forward(&mut moves, state, &pawns, card, seat_index, 12),
        Card::Sorry => collect_sorry(&mut moves, state, &pawns, seat_index),
    }

    moves
}

fn pick_matching<'a>(
    resolutions: &'a [Resolution],
    mv: &Move,
    secondary: bool,
) -> Option<&'a Resolution> {
    resolutions.iter().find(|r| {
        if secondary {
            mv.matches_secondary_dest(r.dest)
        } else {
            mv.matches_dest(r.dest)
        }
    })
}

/// Apply a legal move deterministically, producing the successor state.
///
/// Destinations and bumps are recomputed from the board; the descriptor's
/// destination only selects between alternative resolved outcomes. Sets the
/// win result when the acting seat finishes its fourth pawn.
pub fn apply_move(state: &GameState, mv: &Move) -> Result<GameState, GameError> {
    let mut next = state.clone();

    let pawn = next.pawn(&mv.pawn_id).cloned().ok_or(GameError::IllegalMove)?;
    if pawn.seat_index != mv.seat_index {
        return Err(GameError::IllegalMove);
    }

    match mv.card {
        Card::Sorry => {
            let target_id = mv
                .target_pawn_id
                .as_deref()
                .ok_or(GameError::IllegalMove)?;
            let target = next.pawn(target_id).cloned().ok_or(GameError::IllegalMove)?;
            if target.seat_index == mv.seat_index || pawn.position != Position::Start {
                return Err(GameError::IllegalMove);
            }
            let resolution =
                resolve_sorry(&next, &pawn, &target).ok_or(GameError::IllegalMove)?;
            apply_resolution(&mut next, &pawn.pawn_id, &resolution);
        }
        Card::Eleven if mv.target_pawn_id.is_some() => {
            let target_id = mv.target_pawn_id.as_deref().unwrap_or_default();
            let target = next.pawn(target_id).cloned().ok_or(GameError::IllegalMove)?;
            if !matches!(pawn.position, Position::Track { .. })
                || !matches!(target.position, Position::Track { .. })
                || target.seat_index == mv.seat_index
            {
                return Err(GameError::IllegalMove);
            }
            // Post-switch positions are final; no chained slide applies.
            if let Some(p) = next.pawn_mut(&pawn.pawn_id) {
                p.position = target.position;
            }
            if let Some(t) = next.pawn_mut(target_id) {
                t.position = pawn.position;
            }
        }
        Card::Seven if mv.secondary_pawn_id.is_some() => {
            let first_steps = mv.steps.ok_or(GameError::IllegalMove)?;
            let second_steps = mv.secondary_steps.ok_or(GameError::IllegalMove)?;
            if mv.direction != Some(Direction::Forward)
                || mv.secondary_direction != Some(Direction::Forward)
                || first_steps + second_steps != 7
            {
                return Err(GameError::IllegalMove);
            }
            let resolutions = resolve_forward(&next, &pawn, first_steps);
            let resolution = pick_matching(&resolutions, mv, false)
                .ok_or(GameError::IllegalMove)?
                .clone();
            apply_resolution(&mut next, &pawn.pawn_id, &resolution);

            let second_id = mv.secondary_pawn_id.as_deref().unwrap_or_default();
            let second = next.pawn(second_id).cloned().ok_or(GameError::IllegalMove)?;
            if second.seat_index != mv.seat_index || !second.position.is_movable() {
                return Err(GameError::IllegalMove);
            }
            let resolutions = resolve_forward(&next, &second, second_steps);
            let resolution = pick_matching(&resolutions, mv, true)
                .ok_or(GameError::IllegalMove)?
                .clone();
            apply_resolution(&mut next, second_id, &resolution);
        }
        Card::One | Card::Two if pawn.position == Position::Start => {
            if mv.direction != Some(Direction::Forward) {
                return Err(GameError::IllegalMove);
            }
            let resolution =
                resolve_leave_start(&next, &pawn).ok_or(GameError::IllegalMove)?;
            apply_resolution(&mut next, &pawn.pawn_id, &resolution);
        }
        _ => {
            let steps = mv.steps.ok_or(GameError::IllegalMove)?;
            let resolution = match mv.direction {
                Some(Direction::Forward) => {
                    let resolutions = resolve_forward(&next, &pawn, steps);
                    pick_matching(&resolutions, mv, false)
                        .ok_or(GameError::IllegalMove)?
                        .clone()
                }
                Some(Direction::Backward) => {
                    let resolution =
                        resolve_backward(&next, &pawn, steps).ok_or(GameError::IllegalMove)?;
                    if !mv.matches_dest(resolution.dest) {
                        return Err(GameError::IllegalMove);
                    }
                    resolution
                }
                None => return Err(GameError::IllegalMove),
            };
            apply_resolution(&mut next, &pawn.pawn_id, &resolution);
        }
    }

    if next.seat_has_won(mv.seat_index) {
        next.result = crate::domain::state::GameResult::Win;
        next.winner_seat_index = Some(mv.seat_index);
    }

    Ok(next)
}
