use crate::domain::cards::Card;
use crate::domain::moves::{Direction, Move};
use crate::domain::selector::{select_move, ClientMovePayload, MoveDescriptor};
use crate::domain::state::PositionKind;
use crate::errors::GameError;

fn forward_move(pawn_id: &str, steps: u8, dest_index: u8) -> Move {
    Move {
        card: Card::One,
        seat_index: 0,
        pawn_id: pawn_id.to_string(),
        direction: Some(Direction::Forward),
        steps: Some(steps),
        target_pawn_id: None,
        secondary_pawn_id: None,
        secondary_direction: None,
        secondary_steps: None,
        dest_type: PositionKind::Track,
        dest_index: Some(dest_index),
        secondary_dest_type: None,
        secondary_dest_index: None,
    }
}

fn two_moves() -> Vec<Move> {
    vec![forward_move("p1", 1, 5), forward_move("p2", 1, 9)]
}

fn payload_with_index(index: usize) -> ClientMovePayload {
    ClientMovePayload {
        move_index: Some(index),
        ..Default::default()
    }
}

fn payload_with_descriptor(descriptor: MoveDescriptor) -> ClientMovePayload {
    ClientMovePayload {
        descriptor: Some(descriptor),
        ..Default::default()
    }
}

#[test]
fn empty_set_rejects_no_legal_moves() {
    let err = select_move(&[], &ClientMovePayload::default()).unwrap_err();
    assert_eq!(err, GameError::NoLegalMoves);
}

#[test]
fn single_move_is_picked_without_payload() {
    let moves = vec![forward_move("p1", 1, 5)];
    let picked = select_move(&moves, &ClientMovePayload::default()).unwrap();
    assert_eq!(picked.pawn_id, "p1");
}

#[test]
fn multiple_moves_require_a_selection() {
    let moves = two_moves();
    let err = select_move(&moves, &ClientMovePayload::default()).unwrap_err();
    assert_eq!(err, GameError::MoveSelectionRequired);
}

#[test]
fn index_selection_wins() {
    let moves = two_moves();
    let picked = select_move(&moves, &payload_with_index(1)).unwrap();
    assert_eq!(picked.pawn_id, "p2");
}

#[test]
fn out_of_range_index_falls_through_to_selection_required() {
    let moves = two_moves();
    let err = select_move(&moves, &payload_with_index(7)).unwrap_err();
    assert_eq!(err, GameError::MoveSelectionRequired);
}

#[test]
fn descriptor_filters_on_present_fields() {
    let moves = two_moves();
    let picked = select_move(
        &moves,
        &payload_with_descriptor(MoveDescriptor {
            pawn_id: Some("p2".to_string()),
            ..Default::default()
        }),
    )
    .unwrap();
    assert_eq!(picked.pawn_id, "p2");
}

#[test]
fn descriptor_with_no_match_is_rejected() {
    let moves = two_moves();
    let err = select_move(
        &moves,
        &payload_with_descriptor(MoveDescriptor {
            pawn_id: Some("missing".to_string()),
            ..Default::default()
        }),
    )
    .unwrap_err();
    assert_eq!(err, GameError::InvalidMoveSelectionNoMatch);
}

#[test]
fn ambiguous_descriptor_is_rejected() {
    let moves = two_moves();
    let err = select_move(
        &moves,
        &payload_with_descriptor(MoveDescriptor {
            direction: Some(Direction::Forward),
            ..Default::default()
        }),
    )
    .unwrap_err();
    assert_eq!(err, GameError::InvalidMoveSelectionAmbiguous);
}

#[test]
fn descriptor_can_disambiguate_split_moves() {
    let mut split = forward_move("p1", 3, 33);
    split.card = Card::Seven;
    split.secondary_pawn_id = Some("p2".to_string());
    split.secondary_direction = Some(Direction::Forward);
    split.secondary_steps = Some(4);
    let mut other = split.clone();
    other.steps = Some(4);
    other.secondary_steps = Some(3);
    let moves = vec![split, other];

    let picked = select_move(
        &moves,
        &payload_with_descriptor(MoveDescriptor {
            secondary_steps: Some(3),
            ..Default::default()
        }),
    )
    .unwrap();
    assert_eq!(picked.steps, Some(4));
}

#[test]
fn payload_json_shape_is_camel_case() {
    let payload: ClientMovePayload = serde_json::from_value(serde_json::json!({
        "moveIndex": 2,
        "move": {"pawnId": "p1", "direction": "forward", "steps": 3},
        "secondary": {"moveIndex": 0}
    }))
    .unwrap();
    assert_eq!(payload.move_index, Some(2));
    let descriptor = payload.descriptor.unwrap();
    assert_eq!(descriptor.pawn_id.as_deref(), Some("p1"));
    assert_eq!(descriptor.direction, Some(Direction::Forward));
    assert_eq!(payload.secondary.unwrap().move_index, Some(0));
}
