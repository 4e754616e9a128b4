use crate::domain::cards::Card;
use crate::domain::fixtures::{pid, place_pawn, state_of, two_player_game};
use crate::domain::moves::{apply_move, legal_moves, Direction};
use crate::domain::state::{GameResult, Position, PositionKind};

#[test]
fn card_one_leaves_start_to_the_start_exit() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);

    let moves = legal_moves(state, 0, Card::One);
    assert_eq!(moves.len(), 4, "one leave-start move per pawn");
    for mv in &moves {
        assert_eq!(mv.direction, Some(Direction::Forward));
        assert_eq!(mv.dest_type, PositionKind::Track);
        assert_eq!(mv.dest_index, Some(5));
    }

    let next = apply_move(state, &moves[0]).unwrap();
    let moved = next.pawn(&moves[0].pawn_id).unwrap();
    assert_eq!(moved.position, Position::Track { index: 5 });
}

#[test]
fn card_two_leaves_start_to_the_same_space() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);

    let moves = legal_moves(state, 0, Card::Two);
    assert!(moves
        .iter()
        .all(|m| m.dest_type == PositionKind::Track && m.dest_index == Some(5)));
}

#[test]
fn leave_start_bumps_an_opponent_on_the_exit_space() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(1, 0), Position::Track { index: 5 });

    let moves = legal_moves(state, 0, Card::One);
    let next = apply_move(state, &moves[0]).unwrap();
    assert_eq!(next.pawn(&pid(1, 0)).unwrap().position, Position::Start);
}

#[test]
fn landing_on_an_opponent_slide_start_slides_and_bumps() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    // Seat 1's first slide spans track 16..=19.
    place_pawn(state, &pid(0, 0), Position::Track { index: 15 });
    place_pawn(state, &pid(0, 1), Position::Track { index: 18 });
    place_pawn(state, &pid(1, 0), Position::Track { index: 16 });

    let moves = legal_moves(state, 0, Card::One);
    let mv = moves
        .iter()
        .find(|m| m.pawn_id == pid(0, 0))
        .expect("mover has a legal forward 1");
    assert_eq!(mv.dest_index, Some(19), "slide carries the pawn to its end");

    let next = apply_move(state, mv).unwrap();
    assert_eq!(
        next.pawn(&pid(0, 0)).unwrap().position,
        Position::Track { index: 19 }
    );
    assert_eq!(next.pawn(&pid(1, 0)).unwrap().position, Position::Start);
    // Own pawns on the slide are swept back too.
    assert_eq!(next.pawn(&pid(0, 1)).unwrap().position, Position::Start);
}

#[test]
fn own_pawn_on_the_slide_end_makes_the_landing_illegal() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 15 });
    place_pawn(state, &pid(0, 1), Position::Track { index: 19 });

    let moves = legal_moves(state, 0, Card::One);
    assert!(
        !moves.iter().any(|m| m.pawn_id == pid(0, 0)),
        "sliding into an own pawn at the slide end is a self-bump"
    );
}

#[test]
fn own_first_slide_diverts_into_safety_and_bumps_the_segment() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    // Seat 0's first slide starts at track 1; one step short of it.
    place_pawn(state, &pid(0, 0), Position::Track { index: 0 });
    place_pawn(state, &pid(1, 0), Position::Track { index: 1 });

    let moves = legal_moves(state, 0, Card::One);
    let mv = moves
        .iter()
        .find(|m| m.pawn_id == pid(0, 0))
        .expect("mover has a legal forward 1");
    assert_eq!(mv.dest_type, PositionKind::Safety);
    assert_eq!(mv.dest_index, Some(0));

    let next = apply_move(state, mv).unwrap();
    assert_eq!(
        next.pawn(&pid(0, 0)).unwrap().position,
        Position::Safety { index: 0 }
    );
    assert_eq!(next.pawn(&pid(1, 0)).unwrap().position, Position::Start);
}

#[test]
fn passing_the_entry_enumerates_divert_and_stay() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    // Entry for seat 0 is track 2; three steps from track 1 passes it.
    place_pawn(state, &pid(0, 0), Position::Track { index: 1 });

    let moves = legal_moves(state, 0, Card::Three);
    let dests: Vec<_> = moves
        .iter()
        .filter(|m| m.pawn_id == pid(0, 0))
        .map(|m| (m.dest_type, m.dest_index))
        .collect();
    assert_eq!(
        dests,
        vec![
            (PositionKind::Safety, Some(1)),
            (PositionKind::Track, Some(4)),
        ]
    );

    for mv in moves.iter().filter(|m| m.pawn_id == pid(0, 0)) {
        let next = apply_move(state, mv).unwrap();
        let pos = next.pawn(&pid(0, 0)).unwrap().position;
        assert_eq!(pos.kind(), mv.dest_type);
        assert_eq!(pos.index(), mv.dest_index);
    }
}

#[test]
fn exact_count_into_home() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Safety { index: 3 });

    let moves = legal_moves(state, 0, Card::Two);
    let home = moves
        .iter()
        .find(|m| m.pawn_id == pid(0, 0))
        .expect("forward 2 from Safety[3] reaches Home");
    assert_eq!(home.dest_type, PositionKind::Home);

    let next = apply_move(state, home).unwrap();
    assert_eq!(next.pawn(&pid(0, 0)).unwrap().position, Position::Home);

    // One step more would overshoot: card 3 offers nothing for this pawn.
    let moves = legal_moves(state, 0, Card::Three);
    assert!(!moves.iter().any(|m| m.pawn_id == pid(0, 0)));
}

#[test]
fn self_bump_moves_are_not_generated() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 3 });
    place_pawn(state, &pid(0, 1), Position::Track { index: 4 });

    let moves = legal_moves(state, 0, Card::One);
    assert!(
        !moves.iter().any(|m| m.pawn_id == pid(0, 0)),
        "moves that would land on an own pawn must be excluded"
    );
}

#[test]
fn card_four_moves_backward_only() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 7 });

    let moves = legal_moves(state, 0, Card::Four);
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].direction, Some(Direction::Backward));
    assert_eq!(moves[0].dest_index, Some(3));

    let next = apply_move(state, &moves[0]).unwrap();
    assert_eq!(
        next.pawn(&pid(0, 0)).unwrap().position,
        Position::Track { index: 3 }
    );
}

#[test]
fn backward_landing_on_a_slide_start_still_slides() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 20 });
    place_pawn(state, &pid(1, 0), Position::Track { index: 17 });

    let moves = legal_moves(state, 0, Card::Four);
    let mv = moves
        .iter()
        .find(|m| m.pawn_id == pid(0, 0))
        .expect("backward 4 lands on seat 1's slide start");
    assert_eq!(mv.dest_index, Some(19));

    let next = apply_move(state, mv).unwrap();
    assert_eq!(
        next.pawn(&pid(0, 0)).unwrap().position,
        Position::Track { index: 19 }
    );
    assert_eq!(next.pawn(&pid(1, 0)).unwrap().position, Position::Start);
}

#[test]
fn card_ten_falls_back_to_backward_one_only_when_forward_is_impossible() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    // From Safety[0] a forward 10 overshoots Home; backward 1 exits to the
    // entry space.
    place_pawn(state, &pid(0, 0), Position::Safety { index: 0 });

    let moves = legal_moves(state, 0, Card::Ten);
    assert!(!moves.is_empty());
    assert!(moves.iter().all(|m| m.direction == Some(Direction::Backward)
        && m.steps == Some(1)));

    // With a forward 10 available, no backward moves are offered.
    place_pawn(state, &pid(0, 1), Position::Track { index: 30 });
    let moves = legal_moves(state, 0, Card::Ten);
    assert!(moves.iter().any(|m| m.steps == Some(10)));
    assert!(!moves.iter().any(|m| m.direction == Some(Direction::Backward)));
}

#[test]
fn card_eleven_offers_forward_and_switch_together() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 20 });
    place_pawn(state, &pid(1, 0), Position::Track { index: 40 });

    let moves = legal_moves(state, 0, Card::Eleven);
    assert!(moves
        .iter()
        .any(|m| m.direction == Some(Direction::Forward) && m.steps == Some(11)));

    let switch = moves
        .iter()
        .find(|m| m.target_pawn_id.as_deref() == Some(pid(1, 0).as_str()))
        .expect("switch move against the opponent");

    let next = apply_move(state, switch).unwrap();
    assert_eq!(
        next.pawn(&pid(0, 0)).unwrap().position,
        Position::Track { index: 40 }
    );
    assert_eq!(
        next.pawn(&pid(1, 0)).unwrap().position,
        Position::Track { index: 20 }
    );
}

#[test]
fn card_eleven_cannot_switch_with_protected_pawns() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 20 });
    place_pawn(state, &pid(1, 0), Position::Track { index: 40 });
    place_pawn(state, &pid(1, 1), Position::Safety { index: 0 });
    place_pawn(state, &pid(1, 2), Position::Home);

    let moves = legal_moves(state, 0, Card::Eleven);
    let targets: Vec<_> = moves.iter().filter_map(|m| m.target_pawn_id.clone()).collect();
    assert!(targets.contains(&pid(1, 0)));
    assert!(!targets.contains(&pid(1, 1)));
    assert!(!targets.contains(&pid(1, 2)));
    assert!(!targets.contains(&pid(1, 3)), "start pawns cannot be switched");
}

#[test]
fn card_eleven_yields_nothing_from_start() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    assert!(legal_moves(state, 0, Card::Eleven).is_empty());
}

#[test]
fn card_seven_cannot_leave_start() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    assert!(legal_moves(state, 0, Card::Seven).is_empty());
}

#[test]
fn card_seven_split_uses_all_seven_spaces() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 30 });
    place_pawn(state, &pid(0, 1), Position::Track { index: 40 });

    let moves = legal_moves(state, 0, Card::Seven);
    let splits: Vec<_> = moves
        .iter()
        .filter(|m| m.secondary_pawn_id.is_some())
        .collect();
    assert!(!splits.is_empty());
    for split in &splits {
        assert_eq!(split.steps.unwrap() + split.secondary_steps.unwrap(), 7);
        assert_eq!(split.direction, Some(Direction::Forward));
        assert_eq!(split.secondary_direction, Some(Direction::Forward));
    }
}

#[test]
fn card_seven_split_can_finish_a_pawn_into_home() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Safety { index: 2 });
    place_pawn(state, &pid(0, 1), Position::Track { index: 20 });

    let moves = legal_moves(state, 0, Card::Seven);
    let split = moves
        .iter()
        .find(|m| {
            m.pawn_id == pid(0, 0)
                && m.steps == Some(3)
                && m.secondary_pawn_id.as_deref() == Some(pid(0, 1).as_str())
                && m.secondary_steps == Some(4)
        })
        .expect("split (3, 4) finishing pawn A");
    assert_eq!(split.dest_type, PositionKind::Home);

    let next = apply_move(state, split).unwrap();
    assert_eq!(next.pawn(&pid(0, 0)).unwrap().position, Position::Home);
    assert_eq!(
        next.pawn(&pid(0, 1)).unwrap().position,
        Position::Track { index: 24 }
    );
}

#[test]
fn card_seven_second_leg_sees_the_first_legs_board() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    // B sits 3 ahead of A: after A moves 3, B's space is where A stands, so
    // the split (3 for A, 4 for B) is only legal because legs resolve in
    // order against the updated board.
    place_pawn(state, &pid(0, 0), Position::Track { index: 30 });
    place_pawn(state, &pid(0, 1), Position::Track { index: 33 });

    let moves = legal_moves(state, 0, Card::Seven);
    assert!(
        !moves.iter().any(|m| {
            m.pawn_id == pid(0, 0)
                && m.steps == Some(3)
                && m.secondary_pawn_id.as_deref() == Some(pid(0, 1).as_str())
        }),
        "A cannot land on B for the first leg"
    );
    // The reverse order works: B moves 3 to 36, then A moves 4 to 34.
    assert!(moves.iter().any(|m| {
        m.pawn_id == pid(0, 1)
            && m.steps == Some(3)
            && m.secondary_pawn_id.as_deref() == Some(pid(0, 0).as_str())
            && m.secondary_steps == Some(4)
    }));
}

#[test]
fn sorry_takes_a_start_pawn_to_the_targets_space() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(1, 0), Position::Track { index: 24 });

    let moves = legal_moves(state, 0, Card::Sorry);
    assert_eq!(moves.len(), 4, "each Start pawn pairs with the one target");
    for mv in &moves {
        assert_eq!(mv.target_pawn_id.as_deref(), Some(pid(1, 0).as_str()));
        assert_eq!(mv.dest_index, Some(24));
    }

    let next = apply_move(state, &moves[0]).unwrap();
    assert_eq!(
        next.pawn(&moves[0].pawn_id).unwrap().position,
        Position::Track { index: 24 }
    );
    assert_eq!(next.pawn(&pid(1, 0)).unwrap().position, Position::Start);
}

#[test]
fn sorry_requires_a_start_pawn() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    for slot in 0..4 {
        place_pawn(state, &pid(0, slot), Position::Track { index: 30 + slot as u8 });
    }
    place_pawn(state, &pid(1, 0), Position::Track { index: 50 });

    assert!(legal_moves(state, 0, Card::Sorry).is_empty());
}

#[test]
fn sorry_cannot_target_safety_or_home() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(1, 0), Position::Track { index: 24 });
    place_pawn(state, &pid(1, 1), Position::Safety { index: 0 });
    place_pawn(state, &pid(1, 2), Position::Home);

    let moves = legal_moves(state, 0, Card::Sorry);
    let targets: Vec<_> = moves.iter().filter_map(|m| m.target_pawn_id.clone()).collect();
    assert!(targets.contains(&pid(1, 0)));
    assert!(!targets.contains(&pid(1, 1)));
    assert!(!targets.contains(&pid(1, 2)));
}

#[test]
fn sorry_onto_a_slide_start_rides_the_slide() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    // Target on seat 1's first slide start; the arriving pawn slides to 19.
    place_pawn(state, &pid(1, 0), Position::Track { index: 16 });

    let moves = legal_moves(state, 0, Card::Sorry);
    assert!(!moves.is_empty());
    assert!(moves.iter().all(|m| m.dest_index == Some(19)));

    let next = apply_move(state, &moves[0]).unwrap();
    assert_eq!(
        next.pawn(&moves[0].pawn_id).unwrap().position,
        Position::Track { index: 19 }
    );
    assert_eq!(next.pawn(&pid(1, 0)).unwrap().position, Position::Start);
}

#[test]
fn finishing_the_fourth_pawn_wins_the_game() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Home);
    place_pawn(state, &pid(0, 1), Position::Home);
    place_pawn(state, &pid(0, 2), Position::Home);
    place_pawn(state, &pid(0, 3), Position::Safety { index: 3 });

    let moves = legal_moves(state, 0, Card::Two);
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].dest_type, PositionKind::Home);

    let next = apply_move(state, &moves[0]).unwrap();
    assert_eq!(next.result, GameResult::Win);
    assert_eq!(next.winner_seat_index, Some(0));
}

#[test]
fn apply_move_is_deterministic() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 15 });
    place_pawn(state, &pid(1, 0), Position::Track { index: 17 });

    let moves = legal_moves(state, 0, Card::One);
    let mv = moves.iter().find(|m| m.pawn_id == pid(0, 0)).unwrap();
    let a = apply_move(state, mv).unwrap();
    let b = apply_move(state, mv).unwrap();
    assert_eq!(a, b);
}

#[test]
fn pawn_counts_are_conserved_by_application() {
    let mut game = two_player_game(123);
    let state = state_of(&mut game);
    place_pawn(state, &pid(0, 0), Position::Track { index: 15 });
    place_pawn(state, &pid(0, 1), Position::Track { index: 18 });
    place_pawn(state, &pid(1, 0), Position::Track { index: 16 });

    let moves = legal_moves(state, 0, Card::One);
    for mv in &moves {
        let next = apply_move(state, mv).unwrap();
        assert_eq!(next.pawns_for_seat(0).count(), 4);
        assert_eq!(next.pawns_for_seat(1).count(), 4);
    }
}
